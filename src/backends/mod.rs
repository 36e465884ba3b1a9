/// Built-in collaborators driving Symphonia's container readers and AAC decoder.
pub mod symphonia;

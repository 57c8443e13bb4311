// 領域層：模型與埠，不做 I/O

pub mod model;
pub mod ports;

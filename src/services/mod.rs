pub mod background;
pub mod canvas;
pub mod compression;
pub mod host;
pub mod issuer;
pub mod kv;
pub mod poller;
pub mod storage;

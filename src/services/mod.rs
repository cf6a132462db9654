pub(crate) mod assets;
pub(crate) mod progress;
pub(crate) mod storage;

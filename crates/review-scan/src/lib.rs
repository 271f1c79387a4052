pub mod algorithm;
pub mod markdown;
pub mod rpc;
pub mod severity;

pub use algorithm::{scan, ScanResult};
pub use rpc::{CodeFileEntry, RpcClient, ScanAttemptError, ScanBackend};

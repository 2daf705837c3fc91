pub mod executor;
pub mod options;
pub mod report;
pub mod secure;
pub mod sync;

/// 公共API的prelude模块
/// 用户可以通过 `use app::prelude::*` 来导入最常用的类型
pub mod prelude {
    pub use crate::executor::{DryRunExecutor, Executor, ProcessExecutor, TransferCommand, TransferStatus};
    pub use crate::options::{OptionCategory, OptionSettings, Preset, SyncOptions};
    pub use crate::report::{SubdirOutcome, SyncReport};
    pub use crate::secure::{SecureTransport, SecureTransportSettings};
    pub use crate::sync::{Direction, SyncJob, Synchronizer};
}

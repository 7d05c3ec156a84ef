//! 数据库仓储层
//!
//! 提供所有实体的数据访问接口，封装 SQL 操作细节。
//!
//! ## 设计原则
//!
//! - 仓储只负责数据持久化，不包含业务逻辑
//! - 使用 SQLx 访问托管 PostgreSQL（service-role 连接）
//! - 多步写操作不使用跨调用事务，由服务层决定失败时的处理
//! - 定义 trait 接口以支持 mock 测试
//! - 查询列显式转换为模型类型（金额 `float8`、枚举 `varchar`），不依赖库中列的具体类型
//!
//! 所需表结构与存储过程见 `tests/fixtures/schema.sql`

mod member_repo;
mod payment_repo;
mod receipt_repo;
mod review_repo;
mod stats_repo;
mod traits;

pub use member_repo::MemberRepository;
pub use payment_repo::PaymentRepository;
pub use receipt_repo::ReceiptRepository;
pub use review_repo::ReviewRepository;
pub use stats_repo::StatsRepository;
pub use traits::*;

//! 数据传输对象
//!
//! 请求查询参数与统一响应结构；业务输入直接复用会员服务的 DTO

mod request;
mod response;

pub use request::*;
pub use response::*;

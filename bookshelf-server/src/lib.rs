//! Bookshelf Server - 在线书店后端
//!
//! # 架构概述
//!
//! - **下单** (`orders`): 购物车 → 库存 CAS → 订单账本 → 清空购物车，失败时逐步补偿
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **支付** (`payment`): 支付链接服务 (Cashfree 协议)
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! bookshelf-server/src/
//! ├── core/          # 配置、状态、错误、后台任务
//! ├── api/           # HTTP 路由和处理器
//! ├── orders/        # 下单流程、锁、存储边界
//! ├── services/      # 购物车、评分、验证码、支付
//! ├── payment/       # 支付网关
//! ├── db/            # 数据库层
//! └── utils/         # 日志、校验
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod orders;
pub mod payment;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use orders::{OrderReconciler, PlaceOrder, PlaceOrderError};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
    ____              __        __         ____
   / __ )____  ____  / /_______/ /_  ___  / / __/
  / __  / __ \/ __ \/ //_/ ___/ __ \/ _ \/ / /_
 / /_/ / /_/ / /_/ / ,< (__  ) / / /  __/ / __/
/_____/\____/\____/_/|_/____/_/ /_/\___/_/_/
    "#
    );
}

use std::sync::Arc;
use std::time::Duration;

use crate::core::tasks::{BackgroundTasks, prune_idle_locks};
use crate::core::{Config, Result, ServerError};
use crate::db::DbService;
use crate::db::repository::{
    CartRepository, OrderRepository, OtpRepository, ProductRepository, RatingRepository,
};
use crate::orders::{OrderLocks, OrderReconciler};
use crate::payment::{CashfreeClient, PaymentGateway};
use crate::services::{CartService, LogMailer, OtpMailer, OtpService, PaymentService, RatingService};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，每个请求 clone 一次成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | DbService | 嵌入式数据库 |
/// | products | ProductRepository | 商品目录 |
/// | reconciler | Arc<OrderReconciler> | 下单流程 |
/// | cart | Arc<CartService> | 购物车 |
/// | ratings | RatingService | 评分 |
/// | otp | OtpService | 验证码 |
/// | payments | Arc<PaymentService> | 支付链接 |
/// | locks | Arc<OrderLocks> | 客户/商品锁 (上面各服务共用) |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub products: ProductRepository,
    pub reconciler: Arc<OrderReconciler>,
    pub cart: Arc<CartService>,
    pub ratings: RatingService,
    pub otp: OtpService,
    pub payments: Arc<PaymentService>,
    pub locks: Arc<OrderLocks>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/bookshelf.db) 及 schema
    /// 3. 支付网关与各服务
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure()?;

        let db_path = config.database_path();
        let db = DbService::new(
            &db_path.to_string_lossy(),
            &config.db_namespace,
            &config.db_database,
        )
        .await
        .map_err(|e| ServerError::Database(e.message))?;

        let gateway = Arc::new(CashfreeClient::new(
            config.cashfree_base_url.clone(),
            config.cashfree_app_id.clone(),
            config.cashfree_api_key.clone(),
        ));

        Ok(Self::from_parts(config.clone(), db, gateway, Arc::new(LogMailer)))
    }

    /// 从已打开的数据库和外部依赖组装状态
    ///
    /// 测试里用来替换支付网关和邮件发送
    pub fn from_parts(
        config: Config,
        db: DbService,
        gateway: Arc<dyn PaymentGateway>,
        mailer: Arc<dyn OtpMailer>,
    ) -> Self {
        let locks = Arc::new(OrderLocks::new());
        let products = ProductRepository::new(db.db.clone());
        let carts = Arc::new(CartRepository::new(db.db.clone()));
        let ledger = Arc::new(OrderRepository::new(db.db.clone()));
        let catalog = Arc::new(products.clone());

        let reconciler = Arc::new(OrderReconciler::new(
            carts.clone(),
            catalog.clone(),
            ledger.clone(),
            locks.clone(),
            config.stock_retry_limit,
        ));
        let cart = Arc::new(CartService::new(carts, catalog, locks.clone()));
        let ratings = RatingService::new(
            products.clone(),
            RatingRepository::new(db.db.clone()),
            locks.clone(),
        );
        let otp = OtpService::new(
            OtpRepository::new(db.db.clone()),
            mailer,
            locks.clone(),
            config.otp_ttl_secs,
        );
        let payments = Arc::new(PaymentService::new(gateway, ledger, locks.clone()));

        Self {
            config,
            db,
            products,
            reconciler,
            cart,
            ratings,
            otp,
            payments,
            locks,
        }
    }

    /// 启动后台任务，返回的管理器负责 graceful shutdown
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let every = Duration::from_secs(self.config.lock_prune_interval_secs);
        let token = tasks.shutdown_token();
        tasks.spawn("lock_prune", prune_idle_locks(self.locks.clone(), every, token));

        tracing::info!(count = tasks.len(), "Background tasks started");
        tasks
    }
}

// ==========================================
// 学校课表系统 - 应用层
// ==========================================
// 职责: 组装数据库连接、配置、引擎与 API
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};

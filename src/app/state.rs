// ==========================================
// 学校课表系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::{CourseApi, EnrollmentApi, RosterApi, TimetableApi};
use crate::config::config_manager::ConfigManager;
use crate::db;
use crate::engine::{ConflictEngine, EnrollmentPlanner, SlotCatalog};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "SCHOOL_TIMETABLE_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 课节时间表 (启动时加载,只读共享)
    pub slot_catalog: Arc<SlotCatalog>,

    /// 学籍/师资API
    pub roster_api: Arc<RosterApi>,

    /// 课程API
    pub course_api: Arc<CourseApi>,

    /// 排课API
    pub timetable_api: Arc<TimetableApi>,

    /// 选课API
    pub enrollment_api: Arc<EnrollmentApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并建表
    /// 2. 加载课节时间表
    /// 3. 创建所有API实例 (共享同一连接)
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = db::open_and_init(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 配置
        // ==========================================
        let config = ConfigManager::from_connection(conn.clone())
            .map_err(|e| format!("无法创建ConfigManager: {}", e))?;
        let slot_catalog = Arc::new(
            config
                .load_slot_catalog()
                .map_err(|e| format!("课节时间表配置无效: {}", e))?,
        );

        // ==========================================
        // 引擎与API
        // ==========================================
        let engine = ConflictEngine::new(slot_catalog.clone());
        let planner = EnrollmentPlanner::new();

        let state = Self {
            db_path,
            slot_catalog,
            roster_api: Arc::new(RosterApi::new(conn.clone())),
            course_api: Arc::new(CourseApi::new(conn.clone())),
            timetable_api: Arc::new(TimetableApi::new(conn.clone(), engine)),
            enrollment_api: Arc::new(EnrollmentApi::new(conn, planner)),
        };

        tracing::info!("AppState初始化完成");
        Ok(state)
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./school_timetable.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("school-timetable");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("school_timetable.db");
        }
    }

    path.to_string_lossy().to_string()
}

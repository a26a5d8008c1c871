// ==========================================
// 学校课表系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::engine::slot_catalog::SlotCatalog;
use chrono::NaiveTime;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值 (UPSERT)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(key, "配置已更新");
        Ok(())
    }

    // ===== 课节时间表 =====

    /// 加载课节时间表
    ///
    /// # 返回
    /// - 未配置: 标准时间表
    /// - 已配置: 按配置构建 (必须恰好 8 项且严格递增)
    ///
    /// # 说明
    /// 配置格式为 JSON: ["08:00", "08:55", ...]
    /// 启动时加载一次,之后以 Arc<SlotCatalog> 只读共享
    pub fn load_slot_catalog(&self) -> Result<SlotCatalog, Box<dyn Error>> {
        let raw = match self.get_global_config_value(config_keys::LESSON_SLOT_TIMES)? {
            Some(raw) => raw,
            None => {
                tracing::debug!("未配置课节时间表,使用标准时间表");
                return Ok(SlotCatalog::standard());
            }
        };

        let entries: Vec<String> = serde_json::from_str(&raw)?;
        let times = entries
            .iter()
            .map(|entry| {
                NaiveTime::parse_from_str(entry.trim(), "%H:%M")
                    .map_err(|e| format!("课节时间格式错误 '{}': {}", entry, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let catalog = SlotCatalog::from_times(&times)?;
        tracing::info!(slots = times.len(), "已加载自定义课节时间表");
        Ok(catalog)
    }

    /// 保存课节时间表 (先校验再写入)
    pub fn save_slot_times(&self, times: &[NaiveTime]) -> Result<(), Box<dyn Error>> {
        SlotCatalog::from_times(times)?;
        let entries: Vec<String> = times.iter().map(|t| t.format("%H:%M").to_string()).collect();
        self.set_global_config_value(config_keys::LESSON_SLOT_TIMES, &serde_json::to_string(&entries)?)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 课节时间表 (JSON 数组, 8 项 "HH:MM")
    pub const LESSON_SLOT_TIMES: &str = "lesson_slot_times";
}

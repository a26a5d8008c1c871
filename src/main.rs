// ==========================================
// 学校课表系统 - 命令行入口
// ==========================================
// 子命令:
// - init: 建表
// - slots: 打印课节时间表
// - student-day / teacher-day: 查询某天课表 (JSON 输出)
// ==========================================

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use school_timetable::app::{get_default_db_path, AppState};
use school_timetable::domain::types::{LessonSlotIndex, StudentId, TeacherId};
use school_timetable::{logging, APP_NAME, VERSION};

/// 学校课表系统
#[derive(Debug, Parser)]
#[command(name = "school-timetable", version)]
struct Cli {
    /// 数据库文件路径 (默认: SCHOOL_TIMETABLE_DB_PATH 或用户数据目录)
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 创建数据库表 (幂等)
    Init,

    /// 打印课节时间表
    Slots,

    /// 查询学生某天的课表
    StudentDay {
        /// 学生ID
        student_id: i64,
        /// 日期 (YYYY-MM-DD)
        date: NaiveDate,
    },

    /// 查询教师某天的课表
    TeacherDay {
        /// 教师ID
        teacher_id: i64,
        /// 日期 (YYYY-MM-DD)
        date: NaiveDate,
    },
}

fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    let cli = Cli::parse();
    tracing::info!("{} v{}", APP_NAME, VERSION);

    let db_path = cli.db.unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    match cli.command {
        Command::Init => {
            println!("数据库已就绪: {}", state.db_path);
        }
        Command::Slots => {
            for slot in LessonSlotIndex::all() {
                println!("{}\t{}", slot, state.slot_catalog.slot_time(slot).format("%H:%M"));
            }
        }
        Command::StudentDay { student_id, date } => {
            let lessons = state
                .timetable_api
                .student_day(StudentId(student_id), date)
                .with_context(|| format!("查询学生{}在{}的课表失败", student_id, date))?;
            println!("{}", serde_json::to_string_pretty(&lessons)?);
        }
        Command::TeacherDay { teacher_id, date } => {
            let lessons = state
                .timetable_api
                .teacher_day(TeacherId(teacher_id), date)
                .with_context(|| format!("查询教师{}在{}的课表失败", teacher_id, date))?;
            println!("{}", serde_json::to_string_pretty(&lessons)?);
        }
    }

    Ok(())
}

// ==========================================
// 学校课表系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// 约束: 仓储借用 &Connection,可在 db::unit_of_work 的事务内使用
// ==========================================

pub mod course_repo;
pub mod error;
pub mod lesson_repo;
pub mod sql_types;
pub mod student_repo;
pub mod subject_repo;
pub mod teacher_repo;

// 重导出核心仓储
pub use course_repo::CourseRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use lesson_repo::LessonRepository;
pub use student_repo::StudentRepository;
pub use subject_repo::SubjectRepository;
pub use teacher_repo::TeacherRepository;

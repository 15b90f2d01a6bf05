// One repository per aggregate. Each wraps a cloned PgPool and returns
// DatabaseError; handlers convert to ApiError with `?`.
pub mod assessments;
pub mod blogs;
pub mod messaging;
pub mod notifications;
pub mod payments;
pub mod reports;
pub mod reviews;
pub mod schedules;
pub mod student_profiles;
pub mod tokens;
pub mod tutors;
pub mod users;

pub use assessments::AssessmentRepository;
pub use blogs::BlogRepository;
pub use messaging::MessagingRepository;
pub use notifications::NotificationRepository;
pub use payments::PaymentRepository;
pub use reports::ReportRepository;
pub use reviews::ReviewRepository;
pub use schedules::ScheduleRepository;
pub use student_profiles::StudentProfileRepository;
pub use tokens::TokenRepository;
pub use tutors::TutorRepository;
pub use users::UserRepository;

/// Shared domain enums used across models, handlers and services.
///
/// Each enum is persisted as TEXT and serialized to JSON with its variant name.
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use sqlx::Postgres;

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| UnknownVariant { kind: stringify!($name), value: s.to_string() })
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'q> sqlx::Encode<'q, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }

        impl<'r> sqlx::Decode<'r, Postgres> for $name {
            fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let raw = <&str as sqlx::Decode<Postgres>>::decode(value)?;
                Ok(raw.parse()?)
            }
        }
    };
}

text_enum!(
    /// Account role carried in the access token and checked by route guards
    Role { Parent, Tutor, Staff, Manager, Admin }
);

text_enum!(
    /// Approval workflow shared by reports and tutor registration requests
    RequestStatus { Pending, Approve, Reject }
);

text_enum!(ReportType { TutorComplaint, ReviewComplaint, UnlockAccount });

text_enum!(StudentProfileStatus { Pending, Teaching, Reject, Stop });

text_enum!(AttendanceStatus { NotYet, Attended, Absent });

impl Role {
    /// Staff, managers and admins moderate content and users
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Staff | Role::Manager | Role::Admin)
    }

    pub fn is_management(&self) -> bool {
        matches!(self, Role::Manager | Role::Admin)
    }
}

impl RequestStatus {
    /// Pending is the only state a decision can be made from
    pub fn decide(self, decision: RequestStatus) -> Result<RequestStatus, RequestStatus> {
        match (self, decision) {
            (RequestStatus::Pending, RequestStatus::Approve | RequestStatus::Reject) => Ok(decision),
            (current, _) => Err(current),
        }
    }
}

impl StudentProfileStatus {
    pub fn can_transition_to(self, next: StudentProfileStatus) -> bool {
        use StudentProfileStatus::*;
        matches!(
            (self, next),
            (Pending, Teaching) | (Pending, Reject) | (Teaching, Stop)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("manager".parse::<Role>().unwrap(), Role::Manager);
        assert_eq!("Tutor".parse::<Role>().unwrap(), Role::Tutor);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_as_variant_name() {
        assert_eq!(serde_json::to_string(&Role::Parent).unwrap(), "\"Parent\"");
        assert_eq!(ReportType::UnlockAccount.to_string(), "UnlockAccount");
    }

    #[test]
    fn staff_roles() {
        assert!(Role::Staff.is_staff());
        assert!(Role::Admin.is_staff());
        assert!(!Role::Tutor.is_staff());
        assert!(!Role::Staff.is_management());
    }

    #[test]
    fn decisions_only_from_pending() {
        assert_eq!(RequestStatus::Pending.decide(RequestStatus::Approve), Ok(RequestStatus::Approve));
        assert_eq!(RequestStatus::Pending.decide(RequestStatus::Reject), Ok(RequestStatus::Reject));
        assert_eq!(RequestStatus::Pending.decide(RequestStatus::Pending), Err(RequestStatus::Pending));
        assert_eq!(RequestStatus::Approve.decide(RequestStatus::Reject), Err(RequestStatus::Approve));
    }

    #[test]
    fn student_profile_transitions() {
        use StudentProfileStatus::*;
        assert!(Pending.can_transition_to(Teaching));
        assert!(Teaching.can_transition_to(Stop));
        assert!(!Reject.can_transition_to(Teaching));
        assert!(!Stop.can_transition_to(Teaching));
    }
}

//! Column conversions for identifiers and labelled enums.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::auth::{UserId, UserRole, UserStatus};
use crate::coordination::domain::{
    CategoryId, Priority, RequestId, RequestStatus, ResourceId, ResourceStatus, VolunteerId,
    VolunteerStatus,
};

macro_rules! text_id_column {
    ($($name:ty),+ $(,)?) => {
        $(
            impl ToSql for $name {
                fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                    Ok(ToSqlOutput::from(self.0.as_str()))
                }
            }

            impl FromSql for $name {
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    String::column_result(value).map(Self)
                }
            }
        )+
    };
}

macro_rules! label_column {
    ($($name:ty),+ $(,)?) => {
        $(
            impl ToSql for $name {
                fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                    Ok(ToSqlOutput::from(self.label()))
                }
            }

            impl FromSql for $name {
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    value
                        .as_str()?
                        .parse::<$name>()
                        .map_err(|error| FromSqlError::Other(Box::new(error)))
                }
            }
        )+
    };
}

text_id_column!(CategoryId, ResourceId, RequestId, VolunteerId, UserId);
label_column!(
    Priority,
    RequestStatus,
    VolunteerStatus,
    ResourceStatus,
    UserRole,
    UserStatus
);

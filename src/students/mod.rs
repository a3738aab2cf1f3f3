//! Student records: payload validation and identifier encoding.

pub mod id;
pub mod schema;

pub use id::{MalformedIdentifier, decode_id, encode_id};
pub use schema::{
    FieldError, MAX_GPA, NewStudent, Student, StoredStudent, UpdateStudent, ValidationErrors,
    validate_new_student,
};

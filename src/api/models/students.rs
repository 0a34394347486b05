use crate::db::models::Student;
use serde::Serialize;

/// A student's own record; the id stays inside the token
#[derive(Debug, Serialize)]
pub struct StudentResponse {
    pub name: String,
    pub enrolled_from: String,
    pub enrolled_to: String,
    pub created_on: String,
}

impl From<Student> for StudentResponse {
    fn from(student: Student) -> Self {
        Self {
            name: student.name,
            enrolled_from: student.enrolled_from,
            enrolled_to: student.enrolled_to,
            created_on: student.created_on,
        }
    }
}

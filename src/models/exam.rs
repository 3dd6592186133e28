use serde::{Deserialize, Serialize};

/// An exam ("Ujian") result; shown in reports, ignored by the attendance rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamRecord {
    pub exam_index: u32,
    pub grade: i32,
    pub attempted: bool,
}

impl ExamRecord {
    pub fn new(exam_index: u32, grade: i32, attempted: bool) -> Self {
        Self {
            exam_index,
            grade,
            attempted,
        }
    }
}

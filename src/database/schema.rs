pub const CURRENT_SCHEMA: &str = r#"
PRAGMA foreign_keys = 1;

CREATE TABLE IF NOT EXISTS classes (
    class_id INTEGER PRIMARY KEY AUTOINCREMENT,
    class_name TEXT NOT NULL,
    class_number INTEGER NOT NULL UNIQUE CHECK (class_number > 0),
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS students (
    student_id INTEGER PRIMARY KEY AUTOINCREMENT,
    roll_number TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    fname TEXT NOT NULL,
    age INTEGER,
    class_number INTEGER NOT NULL,
    gender TEXT CHECK (gender IN ('Male', 'Female', 'Other')),
    address TEXT,
    phone TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (class_number) REFERENCES classes (class_number) ON UPDATE CASCADE
);

CREATE TABLE IF NOT EXISTS teachers (
    teacher_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT UNIQUE COLLATE NOCASE,
    phone TEXT,
    qualification TEXT,
    age INTEGER,
    gender TEXT CHECK (gender IN ('Male', 'Female', 'Other')),
    hire_date DATE,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS subjects (
    subject_id INTEGER PRIMARY KEY AUTOINCREMENT,
    subject_name TEXT NOT NULL,
    class_number INTEGER NOT NULL,
    max_marks INTEGER NOT NULL DEFAULT 100 CHECK (max_marks > 0),
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (subject_name, class_number),
    FOREIGN KEY (class_number) REFERENCES classes (class_number) ON UPDATE CASCADE
);

CREATE TABLE IF NOT EXISTS teacher_assignments (
    assignment_id INTEGER PRIMARY KEY AUTOINCREMENT,
    teacher_id INTEGER NOT NULL,
    class_number INTEGER NOT NULL,
    subject_id INTEGER NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (teacher_id, class_number, subject_id),
    FOREIGN KEY (teacher_id) REFERENCES teachers (teacher_id),
    FOREIGN KEY (class_number) REFERENCES classes (class_number) ON UPDATE CASCADE,
    FOREIGN KEY (subject_id) REFERENCES subjects (subject_id)
);

CREATE TABLE IF NOT EXISTS exam_records (
    exam_record_id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id INTEGER NOT NULL,
    subject_id INTEGER NOT NULL,
    marks_obtained INTEGER,
    exam_date DATE,
    FOREIGN KEY (student_id) REFERENCES students (student_id) ON DELETE CASCADE,
    FOREIGN KEY (subject_id) REFERENCES subjects (subject_id)
);

CREATE INDEX IF NOT EXISTS idx_students_class_number ON students (class_number);
CREATE INDEX IF NOT EXISTS idx_subjects_class_number ON subjects (class_number);
CREATE INDEX IF NOT EXISTS idx_teacher_assignments_class_number ON teacher_assignments (class_number);
CREATE INDEX IF NOT EXISTS idx_teacher_assignments_subject_id ON teacher_assignments (subject_id);
CREATE INDEX IF NOT EXISTS idx_exam_records_subject_id ON exam_records (subject_id);
"#;

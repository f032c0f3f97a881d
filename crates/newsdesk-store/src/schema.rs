//! SQL for the `user_login` interaction table.
//!
//! Column names, order, and MySQL types are shared with existing
//! deployments of the table and must not change.

pub const TABLE: &str = "user_login";

/// Columns in table order, as selected by `recent`.
pub const COLUMNS: &str = "id, name, interaction_time, input_text, predicted_category";

pub const MYSQL_CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS user_login (
    id INT AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(255),
    interaction_time DATETIME,
    input_text TEXT,
    predicted_category VARCHAR(50)
)";

/// DuckDB has no `AUTO_INCREMENT`; the id is drawn from a sequence.
pub const DUCKDB_CREATE_TABLE: &str = "CREATE SEQUENCE IF NOT EXISTS user_login_id_seq START 1;
CREATE TABLE IF NOT EXISTS user_login (
    id INTEGER PRIMARY KEY DEFAULT nextval('user_login_id_seq'),
    name VARCHAR(255),
    interaction_time DATETIME,
    input_text TEXT,
    predicted_category VARCHAR(50)
);";

pub const INSERT_PLACEHOLDERS: &str = "INSERT INTO user_login (name, interaction_time, input_text, predicted_category)
VALUES (?, ?, ?, ?)";

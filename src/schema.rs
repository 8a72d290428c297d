pub const SCHEMA_VERSION: &str = "1";

pub const CREATE_SCHEMA_SQL: &str = r#"
BEGIN TRANSACTION;

CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', '1');

-- One row per (scope, key). Several scopes may share a file without overlap.
CREATE TABLE IF NOT EXISTS preferences (
    scope TEXT NOT NULL,
    key   TEXT NOT NULL,
    kind  CHAR(1) NOT NULL, -- Single-character value kind ('B', 'I', 'S')
    value TEXT NOT NULL,
    PRIMARY KEY (scope, key)
);

-- Stored credentials, addressed by (scope, account)
CREATE TABLE IF NOT EXISTS credentials (
    scope   TEXT NOT NULL,
    account TEXT NOT NULL,
    secret  TEXT NOT NULL,
    PRIMARY KEY (scope, account)
);

COMMIT;
"#;

//! Destination dialects.
//!
//! Every warehouse destination type maps to one immutable [`Dialect`]
//! descriptor. All naming, reserved-word and feature decisions that differ
//! between warehouses are read from the descriptor instead of being branched
//! on throughout the handlers.

/// Identifier casing used by a dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Casing {
    Lower,
    Upper,
}

/// Policy descriptor for a destination type.
#[derive(Debug, PartialEq, Eq)]
pub struct Dialect {
    /// Destination type key, e.g. `POSTGRES`
    pub name: &'static str,
    /// Casing applied to every table and column name
    pub casing: Casing,
    /// Longest identifier the warehouse accepts
    pub max_identifier_len: usize,
    /// Lowercase SQL keywords that must be escaped when used as identifiers
    pub reserved_keywords: &'static [&'static str],
    /// Metadata-only columns declared on every non-merge row, besides `uuid_ts`
    pub extra_metadata_columns: &'static [&'static str],
    /// Whether merge-rule rows are generated for this destination
    pub id_resolution: bool,
    /// Object-store datalake without a column budget
    pub datalake: bool,
}

/// Tables owned by the pipeline for its own event types.
pub const RUDDER_CREATED_TABLES: &[&str] =
    &["tracks", "pages", "screens", "aliases", "groups", "accounts"];

/// Tables written by identify that user events must never land in.
pub const RUDDER_ISOLATED_TABLES: &[&str] = &["users", "identifies"];

/// Table receiving identity merge rules.
pub const MERGE_RULES_TABLE: &str = "rudder_identity_merge_rules";

/// Metadata column declared on every non-merge row.
pub const UUID_TS_COLUMN: &str = "uuid_ts";

/// Whether a lowercase table name is owned by the pipeline.
pub fn is_rudder_reserved_table(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    RUDDER_CREATED_TABLES.contains(&name.as_str()) || RUDDER_ISOLATED_TABLES.contains(&name.as_str())
}

const POSTGRES_LIMIT: usize = 63;
const DEFAULT_LIMIT: usize = 127;

static DIALECTS: &[Dialect] = &[
    Dialect {
        name: "POSTGRES",
        casing: Casing::Lower,
        max_identifier_len: POSTGRES_LIMIT,
        reserved_keywords: POSTGRES_KEYWORDS,
        extra_metadata_columns: &[],
        id_resolution: false,
        datalake: false,
    },
    Dialect {
        name: "RS",
        casing: Casing::Lower,
        max_identifier_len: DEFAULT_LIMIT,
        reserved_keywords: REDSHIFT_KEYWORDS,
        extra_metadata_columns: &[],
        id_resolution: false,
        datalake: false,
    },
    Dialect {
        name: "BQ",
        casing: Casing::Lower,
        max_identifier_len: DEFAULT_LIMIT,
        reserved_keywords: BIGQUERY_KEYWORDS,
        extra_metadata_columns: &["loaded_at"],
        id_resolution: true,
        datalake: false,
    },
    Dialect {
        name: "SNOWFLAKE",
        casing: Casing::Upper,
        max_identifier_len: DEFAULT_LIMIT,
        reserved_keywords: SNOWFLAKE_KEYWORDS,
        extra_metadata_columns: &[],
        id_resolution: true,
        datalake: false,
    },
    Dialect {
        name: "MSSQL",
        casing: Casing::Lower,
        max_identifier_len: DEFAULT_LIMIT,
        reserved_keywords: MSSQL_KEYWORDS,
        extra_metadata_columns: &[],
        id_resolution: false,
        datalake: false,
    },
    Dialect {
        name: "AZURE_SYNAPSE",
        casing: Casing::Lower,
        max_identifier_len: DEFAULT_LIMIT,
        reserved_keywords: MSSQL_KEYWORDS,
        extra_metadata_columns: &[],
        id_resolution: false,
        datalake: false,
    },
    Dialect {
        name: "CLICKHOUSE",
        casing: Casing::Lower,
        max_identifier_len: DEFAULT_LIMIT,
        reserved_keywords: &[],
        extra_metadata_columns: &[],
        id_resolution: false,
        datalake: false,
    },
    Dialect {
        name: "DELTALAKE",
        casing: Casing::Lower,
        max_identifier_len: DEFAULT_LIMIT,
        reserved_keywords: DATALAKE_KEYWORDS,
        extra_metadata_columns: &[],
        id_resolution: false,
        datalake: false,
    },
    Dialect {
        name: "S3_DATALAKE",
        casing: Casing::Lower,
        max_identifier_len: DEFAULT_LIMIT,
        reserved_keywords: DATALAKE_KEYWORDS,
        extra_metadata_columns: &[],
        id_resolution: false,
        datalake: true,
    },
    Dialect {
        name: "GCS_DATALAKE",
        casing: Casing::Lower,
        max_identifier_len: DEFAULT_LIMIT,
        reserved_keywords: DATALAKE_KEYWORDS,
        extra_metadata_columns: &[],
        id_resolution: false,
        datalake: true,
    },
    Dialect {
        name: "AZURE_DATALAKE",
        casing: Casing::Lower,
        max_identifier_len: DEFAULT_LIMIT,
        reserved_keywords: DATALAKE_KEYWORDS,
        extra_metadata_columns: &[],
        id_resolution: false,
        datalake: true,
    },
];

impl Dialect {
    /// Look up the descriptor for a destination type key.
    pub fn lookup(destination_type: &str) -> Option<&'static Dialect> {
        DIALECTS.iter().find(|d| d.name == destination_type)
    }

    /// Every known dialect, in a stable order.
    pub fn all() -> &'static [Dialect] {
        DIALECTS
    }

    /// All known destination type keys.
    pub fn names() -> impl Iterator<Item = &'static str> {
        DIALECTS.iter().map(|d| d.name)
    }

    /// Whether a name collides with one of the dialect's SQL keywords.
    pub fn is_reserved_keyword(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        self.reserved_keywords.contains(&lower.as_str())
    }

    /// Apply the dialect's identifier casing.
    pub fn apply_case(&self, name: String) -> String {
        match self.casing {
            Casing::Lower => name,
            Casing::Upper => name.to_uppercase(),
        }
    }

    /// Metadata-only columns every non-merge row declares.
    pub fn metadata_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(UUID_TS_COLUMN).chain(self.extra_metadata_columns.iter().copied())
    }
}

const POSTGRES_KEYWORDS: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric", "both",
    "case", "cast", "check", "collate", "column", "constraint", "create", "current_catalog",
    "current_date", "current_role", "current_time", "current_timestamp", "current_user",
    "default", "deferrable", "desc", "distinct", "do", "else", "end", "except", "false",
    "fetch", "for", "foreign", "from", "grant", "group", "having", "in", "initially",
    "intersect", "into", "lateral", "leading", "limit", "localtime", "localtimestamp", "not",
    "null", "offset", "on", "only", "or", "order", "placing", "primary", "references",
    "returning", "select", "session_user", "some", "symmetric", "table", "then", "to",
    "trailing", "true", "union", "unique", "user", "using", "variadic", "when", "where",
    "window", "with",
];

const REDSHIFT_KEYWORDS: &[&str] = &[
    "aes128", "aes256", "all", "allowoverwrite", "analyse", "analyze", "and", "any", "array",
    "as", "asc", "authorization", "backup", "between", "binary", "blanksasnull", "both",
    "bytedict", "bzip2", "case", "cast", "check", "collate", "column", "constraint", "create",
    "credentials", "cross", "current_date", "current_time", "current_timestamp",
    "current_user", "current_user_id", "default", "deferrable", "deflate", "defrag", "delta",
    "delta32k", "desc", "disable", "distinct", "do", "else", "emptyasnull", "enable",
    "encode", "encrypt", "encryption", "end", "except", "explicit", "false", "for", "foreign",
    "freeze", "from", "full", "globaldict256", "globaldict64k", "grant", "group", "gzip",
    "having", "identity", "ignore", "ilike", "in", "initially", "inner", "intersect", "into",
    "is", "isnull", "join", "leading", "left", "like", "limit", "localtime",
    "localtimestamp", "lun", "luns", "lzo", "lzop", "minus", "mostly13", "mostly32",
    "mostly8", "natural", "new", "not", "notnull", "null", "nulls", "off", "offline",
    "offset", "oid", "old", "on", "only", "open", "or", "order", "outer", "overlaps",
    "parallel", "partition", "percent", "permissions", "placing", "primary", "raw",
    "readratio", "recover", "references", "respect", "rejectlog", "resort", "restore",
    "right", "select", "session_user", "similar", "snapshot", "some", "sysdate", "system",
    "table", "tag", "tdes", "text255", "text32k", "then", "to", "top", "trailing", "true",
    "truncatecolumns", "union", "unique", "user", "using", "verbose", "wallet", "when",
    "where", "with", "without",
];

const BIGQUERY_KEYWORDS: &[&str] = &[
    "all", "and", "any", "array", "as", "asc", "assert_rows_modified", "at", "between", "by",
    "case", "cast", "collate", "contains", "create", "cross", "cube", "current", "default",
    "define", "desc", "distinct", "else", "end", "enum", "escape", "except", "exclude",
    "exists", "extract", "false", "fetch", "following", "for", "from", "full", "group",
    "grouping", "groups", "hash", "having", "if", "ignore", "in", "inner", "intersect",
    "interval", "into", "is", "join", "lateral", "left", "like", "limit", "lookup", "merge",
    "natural", "new", "no", "not", "null", "nulls", "of", "on", "or", "order", "outer",
    "over", "partition", "preceding", "proto", "range", "recursive", "respect", "right",
    "rollup", "rows", "select", "set", "some", "struct", "tablesample", "then", "to", "treat",
    "true", "unbounded", "union", "unnest", "using", "when", "where", "window", "with",
    "within",
];

const SNOWFLAKE_KEYWORDS: &[&str] = &[
    "all", "alter", "and", "any", "as", "between", "by", "case", "cast", "check", "column",
    "connect", "connection", "constraint", "create", "cross", "current", "current_date",
    "current_time", "current_timestamp", "current_user", "database", "delete", "distinct",
    "drop", "else", "exists", "false", "following", "for", "from", "full", "grant", "group",
    "gscluster", "having", "ilike", "in", "increment", "inner", "insert", "intersect",
    "into", "is", "issue", "join", "lateral", "left", "like", "localtime", "localtimestamp",
    "minus", "natural", "not", "null", "of", "on", "or", "order", "organization", "qualify",
    "regexp", "revoke", "right", "rlike", "row", "rows", "sample", "schema", "select", "set",
    "some", "start", "table", "tablesample", "then", "to", "trigger", "true", "try_cast",
    "union", "unique", "update", "using", "values", "view", "when", "whenever", "where",
    "with",
];

const MSSQL_KEYWORDS: &[&str] = &[
    "add", "all", "alter", "and", "any", "as", "asc", "authorization", "backup", "begin",
    "between", "break", "browse", "bulk", "by", "cascade", "case", "check", "checkpoint",
    "close", "clustered", "coalesce", "collate", "column", "commit", "compute", "constraint",
    "contains", "containstable", "continue", "convert", "create", "cross", "current",
    "current_date", "current_time", "current_timestamp", "current_user", "cursor",
    "database", "dbcc", "deallocate", "declare", "default", "delete", "deny", "desc", "disk",
    "distinct", "distributed", "double", "drop", "dump", "else", "end", "errlvl", "escape",
    "except", "exec", "execute", "exists", "exit", "external", "fetch", "file", "fillfactor",
    "for", "foreign", "freetext", "freetexttable", "from", "full", "function", "goto",
    "grant", "group", "having", "holdlock", "identity", "identity_insert", "identitycol",
    "if", "in", "index", "inner", "insert", "intersect", "into", "is", "join", "key", "kill",
    "left", "like", "lineno", "load", "merge", "national", "nocheck", "nonclustered", "not",
    "null", "nullif", "of", "off", "offsets", "on", "open", "opendatasource", "openquery",
    "openrowset", "openxml", "option", "or", "order", "outer", "over", "percent", "pivot",
    "plan", "precision", "primary", "print", "proc", "procedure", "public", "raiserror",
    "read", "readtext", "reconfigure", "references", "replication", "restore", "restrict",
    "return", "revert", "revoke", "right", "rollback", "rowcount", "rowguidcol", "rule",
    "save", "schema", "securityaudit", "select", "semantickeyphrasetable",
    "semanticsimilaritydetailstable", "semanticsimilaritytable", "session_user", "set",
    "setuser", "shutdown", "some", "statistics", "system_user", "table", "tablesample",
    "textsize", "then", "to", "top", "tran", "transaction", "trigger", "truncate",
    "try_convert", "tsequal", "union", "unique", "unpivot", "update", "updatetext", "use",
    "user", "values", "varying", "view", "waitfor", "when", "where", "while", "with",
    "writetext",
];

const DATALAKE_KEYWORDS: &[&str] = &[
    "all", "alter", "and", "array", "as", "authorization", "between", "bigint", "binary",
    "boolean", "both", "by", "case", "cast", "char", "column", "conf", "create", "cross",
    "cube", "current", "current_date", "current_timestamp", "cursor", "database", "date",
    "decimal", "delete", "describe", "distinct", "double", "drop", "else", "end", "exchange",
    "exists", "extended", "external", "false", "fetch", "float", "following", "for", "from",
    "full", "function", "grant", "group", "grouping", "having", "if", "import", "in",
    "inner", "insert", "int", "intersect", "interval", "into", "is", "join", "lateral",
    "left", "less", "like", "local", "macro", "map", "more", "none", "not", "null", "of",
    "on", "or", "order", "out", "outer", "over", "partialscan", "partition", "percent",
    "preceding", "preserve", "procedure", "range", "reads", "reduce", "revoke", "right",
    "rollup", "row", "rows", "select", "set", "smallint", "table", "tablesample", "then",
    "timestamp", "to", "transform", "trigger", "true", "truncate", "unbounded", "union",
    "uniquejoin", "update", "user", "using", "utc_timestamp", "values", "varchar", "when",
    "where", "window", "with",
];

//! Database schema definitions

/// SQL to create the clients table
pub const CREATE_CLIENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS clients (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT,
    phone TEXT,
    industry TEXT,
    status TEXT NOT NULL DEFAULT 'active'
)
"#;

/// SQL to create the contracts table
pub const CREATE_CONTRACTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS contracts (
    id INTEGER PRIMARY KEY,
    client_id INTEGER REFERENCES clients(id),
    contract_number TEXT,
    contract_name TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'draft',
    start_date TEXT,
    end_date TEXT,
    total_value REAL
)
"#;

/// SQL to create the service_scopes table
/// A scope belongs to a contract and may be authorized by a SAF
pub const CREATE_SERVICE_SCOPES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS service_scopes (
    id INTEGER PRIMARY KEY,
    contract_id INTEGER REFERENCES contracts(id),
    saf_id INTEGER REFERENCES safs(id),
    service_id INTEGER REFERENCES services(id),
    scope_name TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'active'
)
"#;

/// SQL to create the assets table
pub const CREATE_ASSETS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS assets (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    asset_tag TEXT,
    asset_type TEXT,
    serial_number TEXT,
    status TEXT NOT NULL DEFAULT 'active'
)
"#;

/// SQL to create the client_assets assignment table
pub const CREATE_CLIENT_ASSETS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS client_assets (
    client_id INTEGER NOT NULL REFERENCES clients(id),
    asset_id INTEGER NOT NULL REFERENCES assets(id),
    assigned_at TEXT,
    PRIMARY KEY (client_id, asset_id)
)
"#;

/// SQL to create the safs (service authorization forms) table
pub const CREATE_SAFS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS safs (
    id INTEGER PRIMARY KEY,
    client_id INTEGER REFERENCES clients(id),
    saf_number TEXT,
    title TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'draft'
)
"#;

/// SQL to create the cocs (compliance certificates) table
pub const CREATE_COCS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS cocs (
    id INTEGER PRIMARY KEY,
    client_id INTEGER REFERENCES clients(id),
    saf_id INTEGER REFERENCES safs(id),
    coc_number TEXT,
    title TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    issued_date TEXT
)
"#;

/// SQL to create the proposals table
pub const CREATE_PROPOSALS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS proposals (
    id INTEGER PRIMARY KEY,
    contract_id INTEGER REFERENCES contracts(id),
    proposal_number TEXT,
    title TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'draft'
)
"#;

/// SQL to create the documents table
/// A document can hang off a client, a contract, or both
pub const CREATE_DOCUMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY,
    client_id INTEGER REFERENCES clients(id),
    contract_id INTEGER REFERENCES contracts(id),
    title TEXT NOT NULL,
    filename TEXT,
    document_type TEXT
)
"#;

/// SQL to create the financial_transactions table
pub const CREATE_FINANCIAL_TRANSACTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS financial_transactions (
    id INTEGER PRIMARY KEY,
    contract_id INTEGER REFERENCES contracts(id),
    reference_number TEXT,
    transaction_type TEXT,
    amount REAL,
    description TEXT
)
"#;

/// SQL to create the license_pools table
pub const CREATE_LICENSE_POOLS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS license_pools (
    id INTEGER PRIMARY KEY,
    product_name TEXT NOT NULL,
    vendor TEXT,
    license_type TEXT,
    total_licenses INTEGER
)
"#;

/// SQL to create the license_assignments table
pub const CREATE_LICENSE_ASSIGNMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS license_assignments (
    client_id INTEGER NOT NULL REFERENCES clients(id),
    license_pool_id INTEGER NOT NULL REFERENCES license_pools(id),
    quantity INTEGER NOT NULL DEFAULT 1,
    PRIMARY KEY (client_id, license_pool_id)
)
"#;

/// SQL to create the services table
pub const CREATE_SERVICES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS services (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    category TEXT,
    description TEXT
)
"#;

/// SQL to create the users table
pub const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT,
    role TEXT
)
"#;

/// SQL to create the audit_logs table
pub const CREATE_AUDIT_LOGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS audit_logs (
    id INTEGER PRIMARY KEY,
    user_id INTEGER REFERENCES users(id),
    action TEXT NOT NULL,
    entity_type TEXT,
    entity_id INTEGER,
    description TEXT,
    created_at TEXT
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_contracts_client ON contracts(client_id)",
    "CREATE INDEX IF NOT EXISTS idx_service_scopes_contract ON service_scopes(contract_id)",
    "CREATE INDEX IF NOT EXISTS idx_service_scopes_saf ON service_scopes(saf_id)",
    "CREATE INDEX IF NOT EXISTS idx_service_scopes_service ON service_scopes(service_id)",
    "CREATE INDEX IF NOT EXISTS idx_client_assets_asset ON client_assets(asset_id)",
    "CREATE INDEX IF NOT EXISTS idx_safs_client ON safs(client_id)",
    "CREATE INDEX IF NOT EXISTS idx_cocs_client ON cocs(client_id)",
    "CREATE INDEX IF NOT EXISTS idx_cocs_saf ON cocs(saf_id)",
    "CREATE INDEX IF NOT EXISTS idx_proposals_contract ON proposals(contract_id)",
    "CREATE INDEX IF NOT EXISTS idx_documents_client ON documents(client_id)",
    "CREATE INDEX IF NOT EXISTS idx_documents_contract ON documents(contract_id)",
    "CREATE INDEX IF NOT EXISTS idx_transactions_contract ON financial_transactions(contract_id)",
    "CREATE INDEX IF NOT EXISTS idx_license_assignments_pool ON license_assignments(license_pool_id)",
    "CREATE INDEX IF NOT EXISTS idx_audit_logs_user ON audit_logs(user_id)",
];

/// Tables the store knows about, in dependency order
pub const TABLES: &[&str] = &[
    "clients",
    "contracts",
    "assets",
    "client_assets",
    "safs",
    "cocs",
    "services",
    "service_scopes",
    "proposals",
    "documents",
    "financial_transactions",
    "license_pools",
    "license_assignments",
    "users",
    "audit_logs",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_CLIENTS_TABLE,
        CREATE_CONTRACTS_TABLE,
        CREATE_ASSETS_TABLE,
        CREATE_CLIENT_ASSETS_TABLE,
        CREATE_SAFS_TABLE,
        CREATE_COCS_TABLE,
        CREATE_SERVICES_TABLE,
        CREATE_SERVICE_SCOPES_TABLE,
        CREATE_PROPOSALS_TABLE,
        CREATE_DOCUMENTS_TABLE,
        CREATE_FINANCIAL_TRANSACTIONS_TABLE,
        CREATE_LICENSE_POOLS_TABLE,
        CREATE_LICENSE_ASSIGNMENTS_TABLE,
        CREATE_USERS_TABLE,
        CREATE_AUDIT_LOGS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

pub fn is_known_table(table: &str) -> bool {
    TABLES.contains(&table)
}

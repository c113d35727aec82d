//! Shared in-memory datasets for tests

use crate::storage::SqliteStore;

/// Clients with contracts, one asset assignment and a few reference rows.
///
/// Client 5 (Acme Corp) owns exactly contracts 101-103 and nothing else.
/// Clients 5, 6 and 9 mention "acme"; 7 and 8 do not.
pub(crate) fn portfolio() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .execute_batch(
            r#"
            INSERT INTO clients (id, name, email, industry) VALUES
                (5, 'Acme Corp', 'ops@acme.example', 'Manufacturing'),
                (6, 'Acme Logistics', 'desk@acmelogistics.example', 'Transport'),
                (7, 'Globex Industries', 'info@globex.example', 'Energy'),
                (8, 'Initech', 'contact@initech.example', 'Software'),
                (9, 'acme-lab Research', NULL, 'Research');

            INSERT INTO contracts (id, client_id, contract_number, contract_name, status) VALUES
                (101, 5, 'CN-101', 'Acme Managed Services', 'active'),
                (102, 5, 'CN-102', 'Help Desk Support', 'active'),
                (103, 5, 'CN-103', 'Backup and Recovery', 'draft'),
                (104, 7, 'CN-104', 'Globex Network Refresh', 'active');

            INSERT INTO assets (id, name, asset_tag, asset_type) VALUES
                (301, 'Core Switch', 'AT-301', 'network');
            INSERT INTO client_assets (client_id, asset_id) VALUES (7, 301);

            INSERT INTO services (id, name, category) VALUES (1, 'Managed Firewall', 'security');
            INSERT INTO service_scopes (id, contract_id, service_id, scope_name) VALUES
                (21, 104, 1, 'Perimeter Firewall');

            INSERT INTO proposals (id, contract_id, proposal_number, title) VALUES
                (201, 101, 'P-201', 'Year Two Renewal');

            INSERT INTO users (id, name, email, role) VALUES (1, 'Dana Smith', 'dana@msp.example', 'admin');
            INSERT INTO audit_logs (id, user_id, action, entity_type, entity_id, description) VALUES
                (1, 1, 'update', 'contract', 101, 'Changed renewal date');
            "#,
        )
        .unwrap();
    store
}

/// One client's compliance chain: SAF 10 authorizes COCs 7 and 8 and
/// service scope 20 under contract 101.
pub(crate) fn compliance() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .execute_batch(
            r#"
            INSERT INTO clients (id, name, email, industry) VALUES
                (5, 'Acme Corp', 'ops@acme.example', 'Manufacturing');
            INSERT INTO contracts (id, client_id, contract_number, contract_name) VALUES
                (101, 5, 'CN-101', 'Acme Managed Services');
            INSERT INTO safs (id, client_id, saf_number, title, status) VALUES
                (10, 5, 'SAF-10', 'Firewall Rollout', 'approved');
            INSERT INTO cocs (id, client_id, saf_id, coc_number, title, issued_date) VALUES
                (7, 5, 10, 'COC-7', 'Firewall Phase 1', '2024-03-01'),
                (8, 5, 10, 'COC-8', 'Firewall Phase 2', '2024-06-01');
            INSERT INTO services (id, name, category) VALUES (1, 'Managed Firewall', 'security');
            INSERT INTO service_scopes (id, contract_id, saf_id, service_id, scope_name) VALUES
                (20, 101, 10, 1, 'Perimeter Firewall');
            "#,
        )
        .unwrap();
    store
}

/// Append `count` plain clients starting at `start_id`
pub(crate) fn add_clients(store: &SqliteStore, start_id: i64, count: usize) {
    for offset in 0..count as i64 {
        let id = start_id + offset;
        store
            .execute_batch(&format!(
                "INSERT INTO clients (id, name, industry) VALUES ({id}, 'Client {id}', 'Retail')"
            ))
            .unwrap();
    }
}

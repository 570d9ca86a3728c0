//! Demo tenant used for local development and walkthroughs.
//!
//! Seeding is idempotent: when a company with the `demo` slug already exists
//! nothing is written.

use rusqlite::Connection;
use tracing::info;

use super::models::{ApprovalStep, Decision, Priority, RequestStatus, Role};
use super::queries::{self, NewItem, NewProduct, NewRequest, NewUser};
use super::Database;
use crate::auth::service::hash_password;
use crate::errors::AppResult;

pub const DEMO_SLUG: &str = "demo";
pub const DEMO_PASSWORD: &str = "demo-password";

const DEMO_USERS: [(&str, &str, Role); 6] = [
    ("admin@demo.local", "Ayşe Yılmaz", Role::Admin),
    ("manager@demo.local", "Mehmet Demir", Role::Manager),
    ("user@demo.local", "Zeynep Kaya", Role::User),
    ("it@demo.local", "Can Öztürk", Role::It),
    ("finance@demo.local", "Elif Şahin", Role::Finance),
    ("purchasing@demo.local", "Burak Arslan", Role::Purchasing),
];

const DEMO_PRODUCTS: [(&str, &str, i64); 4] = [
    ("Dizüstü bilgisayar", "hardware", 42_000_00),
    ("27\" monitör", "hardware", 8_500_00),
    ("Kablosuz klavye ve fare", "peripherals", 1_200_00),
    ("Ofis yazılımı lisansı (1 yıl)", "software", 3_600_00),
];

struct DemoIds {
    company_id: i64,
    requester_id: i64,
    department_id: i64,
    manager_id: i64,
    it_id: i64,
    finance_id: i64,
    purchasing_id: i64,
    product_ids: Vec<i64>,
}

/// Creates the demo company unless it exists. Returns whether anything was written.
pub async fn seed_demo(db: &Database) -> AppResult<bool> {
    let password_hash = hash_password(DEMO_PASSWORD)?;
    let seeded = db
        .transaction(move |tx| {
            if queries::find_company_by_slug(tx, DEMO_SLUG)?.is_some() {
                return Ok(false);
            }
            let ids = seed_directory(tx, &password_hash)?;
            seed_requests(tx, &ids)?;
            Ok(true)
        })
        .await?;

    if seeded {
        info!(slug = DEMO_SLUG, "demo tenant seeded");
    }
    Ok(seeded)
}

fn seed_directory(conn: &Connection, password_hash: &str) -> AppResult<DemoIds> {
    let company = queries::insert_company(conn, "Demo A.Ş.", DEMO_SLUG)?;
    let mut operations = queries::insert_department(conn, company.id, "Operasyon", None)?;
    queries::insert_department(conn, company.id, "Bilgi Teknolojileri", None)?;

    let mut user_ids = Vec::with_capacity(DEMO_USERS.len());
    for (email, full_name, role) in DEMO_USERS {
        let department_id = match role {
            Role::Manager | Role::User => Some(operations.id),
            _ => None,
        };
        let user = queries::insert_user(
            conn,
            &NewUser {
                company_id: company.id,
                department_id,
                email,
                full_name,
                password_hash,
                role,
            },
        )?;
        user_ids.push(user.id);
    }

    operations.manager_id = Some(user_ids[1]);
    queries::save_department(conn, &operations)?;

    let mut product_ids = Vec::with_capacity(DEMO_PRODUCTS.len());
    for (name, category, unit_price_cents) in DEMO_PRODUCTS {
        let product = queries::insert_product(
            conn,
            &NewProduct {
                company_id: company.id,
                name,
                category,
                description: "",
                unit_price_cents,
                currency: "TRY",
            },
        )?;
        product_ids.push(product.id);
    }

    Ok(DemoIds {
        company_id: company.id,
        requester_id: user_ids[2],
        department_id: operations.id,
        manager_id: user_ids[1],
        it_id: user_ids[3],
        finance_id: user_ids[4],
        purchasing_id: user_ids[5],
        product_ids,
    })
}

fn seed_requests(conn: &Connection, ids: &DemoIds) -> AppResult<()> {
    let manager = (ApprovalStep::DepartmentManager, ids.manager_id, Decision::Approved);
    let it = (ApprovalStep::It, ids.it_id, Decision::Approved);
    let finance = (ApprovalStep::Finance, ids.finance_id, Decision::Approved);
    let started = (ApprovalStep::Purchasing, ids.purchasing_id, Decision::PurchaseStarted);
    let completed = (ApprovalStep::Purchasing, ids.purchasing_id, Decision::Completed);
    let rejected = (ApprovalStep::It, ids.it_id, Decision::Rejected);

    let scenarios = [
        (
            "Yeni çalışan için dizüstü bilgisayar",
            0,
            1,
            RequestStatus::Pending,
            Some(ApprovalStep::DepartmentManager),
            vec![],
        ),
        (
            "Toplantı odası için monitör",
            1,
            2,
            RequestStatus::Approved,
            Some(ApprovalStep::Purchasing),
            vec![manager, it, finance],
        ),
        (
            "Ekip için klavye ve fare",
            2,
            5,
            RequestStatus::Rejected,
            None,
            vec![manager, rejected],
        ),
        (
            "Ofis yazılımı lisans yenilemesi",
            3,
            10,
            RequestStatus::InPurchasing,
            Some(ApprovalStep::Purchasing),
            vec![manager, it, finance, started],
        ),
        (
            "Depo için yedek monitör",
            1,
            1,
            RequestStatus::Completed,
            None,
            vec![manager, it, finance, started, completed],
        ),
    ];

    for (title, product_index, quantity, status, step, decisions) in scenarios {
        let product_id = ids.product_ids[product_index];
        let (_, _, unit_price_cents) = DEMO_PRODUCTS[product_index];
        let request_id = queries::insert_request(
            conn,
            &NewRequest {
                company_id: ids.company_id,
                requester_id: ids.requester_id,
                department_id: ids.department_id,
                title,
                description: "",
                justification: "Demo verisi",
                priority: Priority::Medium,
                total_cents: unit_price_cents * quantity,
                currency: "TRY",
            },
        )?;
        queries::insert_item(
            conn,
            request_id,
            &NewItem {
                product_id: Some(product_id),
                description: DEMO_PRODUCTS[product_index].0,
                quantity,
                unit_price_cents,
            },
        )?;
        for (decided_step, approver_id, decision) in decisions {
            let comment = (decision == Decision::Rejected).then_some("Bütçe bu çeyrekte uygun değil");
            queries::insert_approval(conn, request_id, decided_step, approver_id, decision, comment)?;
        }
        queries::update_request_state(conn, request_id, status, step)?;
    }
    Ok(())
}

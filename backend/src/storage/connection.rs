use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool, Transaction};
use std::sync::Arc;
use tracing::info;

/// DbConnection owns the SQLite pool shared by every repository
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Connect to `url`, creating the database file and schema if needed
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("Creating database {}", url);
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Fresh private in-memory database, used by tests
    pub async fn in_memory() -> Result<Self> {
        let db_url = format!(
            "sqlite:file:memdb_{}?mode=memory&cache=shared",
            uuid::Uuid::new_v4()
        );
        Self::new(&db_url).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start a transaction for writes that span several rows
    pub async fn begin(&self) -> sqlx::Result<Transaction<'static, Sqlite>> {
        self.pool.begin().await
    }

    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        Ok(())
    }
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE COLLATE NOCASE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'User',
        created_at TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS members (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        full_name TEXT NOT NULL,
        cpf TEXT,
        rg TEXT,
        birth_date TEXT,
        gender TEXT NOT NULL,
        marital_status TEXT NOT NULL,
        profession TEXT,
        education TEXT,
        photo_path TEXT,
        email TEXT NOT NULL UNIQUE COLLATE NOCASE,
        phone TEXT NOT NULL,
        alternative_phone TEXT,
        address TEXT,
        neighborhood TEXT,
        city TEXT,
        state TEXT,
        zip_code TEXT,
        membership_date TEXT NOT NULL,
        membership_type TEXT NOT NULL,
        baptism_status TEXT NOT NULL,
        baptism_date TEXT,
        baptism_location TEXT,
        previous_church TEXT,
        ministry TEXT,
        cell_group TEXT,
        leadership_position TEXT,
        emergency_contact_name TEXT,
        emergency_contact_phone TEXT,
        emergency_contact_relationship TEXT,
        notes TEXT,
        is_active INTEGER NOT NULL DEFAULT 1
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS family_members (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        member_id INTEGER NOT NULL REFERENCES members(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        relationship TEXT NOT NULL,
        birth_date TEXT,
        phone TEXT,
        email TEXT,
        is_church_member INTEGER NOT NULL DEFAULT 0,
        church_member_id INTEGER,
        notes TEXT
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_family_members_member ON family_members(member_id);",
    r#"
    CREATE TABLE IF NOT EXISTS music_school_students (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE COLLATE NOCASE,
        phone TEXT NOT NULL,
        birth_date TEXT,
        parent_name TEXT,
        parent_phone TEXT,
        instrument TEXT NOT NULL,
        level TEXT NOT NULL,
        teacher TEXT,
        class_type TEXT NOT NULL,
        class_schedule TEXT,
        monthly_fee REAL NOT NULL DEFAULT 0,
        payment_status TEXT NOT NULL,
        last_payment_date TEXT,
        enrollment_date TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        status TEXT NOT NULL,
        notes TEXT,
        progress TEXT,
        total_classes INTEGER NOT NULL DEFAULT 0,
        attended_classes INTEGER NOT NULL DEFAULT 0
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS music_school_pre_registrations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT NOT NULL,
        birth_date TEXT,
        parent_name TEXT,
        parent_email TEXT,
        parent_phone TEXT,
        address TEXT,
        neighborhood TEXT,
        city TEXT,
        state TEXT,
        zip_code TEXT,
        instrument TEXT NOT NULL,
        level TEXT NOT NULL,
        preferred_class_type TEXT NOT NULL,
        preferred_schedule TEXT,
        has_musical_experience INTEGER NOT NULL DEFAULT 0,
        musical_experience TEXT,
        questions TEXT,
        pre_registration_date TEXT NOT NULL,
        status TEXT NOT NULL,
        contact_date TEXT,
        admin_notes TEXT,
        is_processed INTEGER NOT NULL DEFAULT 0
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS jiu_jitsu_students (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE COLLATE NOCASE,
        phone TEXT NOT NULL,
        cpf TEXT,
        birth_date TEXT,
        address TEXT,
        belt TEXT NOT NULL,
        stripes INTEGER NOT NULL DEFAULT 0,
        last_promotion_date TEXT,
        monthly_fee REAL NOT NULL DEFAULT 0,
        last_payment_date TEXT,
        payment_status TEXT NOT NULL,
        emergency_contact TEXT,
        emergency_phone TEXT,
        health_conditions TEXT,
        notes TEXT,
        enrollment_date TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS jiu_jitsu_graduations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id INTEGER NOT NULL REFERENCES jiu_jitsu_students(id) ON DELETE CASCADE,
        from_belt TEXT NOT NULL,
        to_belt TEXT NOT NULL,
        from_stripes INTEGER NOT NULL,
        to_stripes INTEGER NOT NULL,
        graduation_date TEXT NOT NULL,
        graduated_by TEXT,
        notes TEXT
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS jiu_jitsu_attendances (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id INTEGER NOT NULL REFERENCES jiu_jitsu_students(id) ON DELETE CASCADE,
        date TEXT NOT NULL,
        class_type TEXT NOT NULL,
        is_present INTEGER NOT NULL,
        notes TEXT
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS jiu_jitsu_payments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id INTEGER NOT NULL REFERENCES jiu_jitsu_students(id) ON DELETE CASCADE,
        payment_date TEXT NOT NULL,
        amount REAL NOT NULL,
        payment_method TEXT NOT NULL,
        reference_month TEXT NOT NULL,
        notes TEXT
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_jj_graduations_student ON jiu_jitsu_graduations(student_id);",
    "CREATE INDEX IF NOT EXISTS idx_jj_attendances_student ON jiu_jitsu_attendances(student_id, date DESC);",
    "CREATE INDEX IF NOT EXISTS idx_jj_payments_student ON jiu_jitsu_payments(student_id, payment_date DESC);",
    r#"
    CREATE TABLE IF NOT EXISTS mens_group_members (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE COLLATE NOCASE,
        phone TEXT NOT NULL,
        join_date TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        role TEXT,
        notes TEXT
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS child_presentations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        child_name TEXT NOT NULL,
        birth_date TEXT,
        gender TEXT NOT NULL,
        birth_place TEXT,
        father_name TEXT NOT NULL,
        father_profession TEXT,
        mother_name TEXT NOT NULL,
        mother_profession TEXT,
        presentation_date TEXT NOT NULL,
        pastor TEXT NOT NULL,
        biblical_verse TEXT,
        special_message TEXT,
        address TEXT,
        city TEXT,
        phone TEXT,
        email TEXT,
        church_name TEXT NOT NULL,
        church_address TEXT,
        certificate_generated INTEGER NOT NULL DEFAULT 0,
        certificate_path TEXT,
        created_at TEXT NOT NULL,
        notes TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        CHECK ((certificate_generated = 0 AND certificate_path IS NULL)
            OR (certificate_generated = 1 AND certificate_path IS NOT NULL))
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_presentations_date ON child_presentations(presentation_date DESC);",
];

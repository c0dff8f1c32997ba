//! Pet repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide typed CRUD and search APIs over canonical `pets` storage.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `validate()` before SQL mutations.
//! - Ids come from SQLite `AUTOINCREMENT`: strictly increasing, never reused.
//! - Bulk inserts are all-or-nothing.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::pet::{Pet, PetDraft, PetId, PetValidationError};
use crate::search::{FilterError, PetFilter};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const PET_TABLE: &str = "pets";

const PET_COLUMNS: &[&str] = &[
    "id",
    "name",
    "species",
    "breed",
    "gender",
    "image",
    "description",
    "price",
];

const PET_SELECT_SQL: &str = "SELECT
    id,
    name,
    species,
    breed,
    gender,
    image,
    description,
    price
FROM pets";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for pet persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(PetValidationError),
    Db(DbError),
    NotFound(PetId),
    InvalidData(String),
    InvalidQuery(FilterError),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "pet not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted pet data: {message}"),
            Self::InvalidQuery(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidQuery(err) => Some(err),
            Self::NotFound(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<PetValidationError> for RepoError {
    fn from(value: PetValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<FilterError> for RepoError {
    fn from(value: FilterError) -> Self {
        Self::InvalidQuery(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the pet record store.
///
/// `update` and `delete_by_id` do not guard existence on behalf of callers;
/// they report `NotFound` when no row changed.
pub trait PetRepository {
    fn insert(&self, draft: &PetDraft) -> RepoResult<Pet>;
    fn insert_bulk(&self, drafts: &[PetDraft]) -> RepoResult<Vec<Pet>>;
    fn find_all(&self) -> RepoResult<Vec<Pet>>;
    fn find_by_id(&self, id: PetId) -> RepoResult<Option<Pet>>;
    fn exists(&self, id: PetId) -> RepoResult<bool>;
    fn update(&self, pet: &Pet) -> RepoResult<()>;
    fn delete_by_id(&self, id: PetId) -> RepoResult<()>;
    fn search_by_keyword(&self, key: &str) -> RepoResult<Vec<Pet>>;
    fn search_by_max_price(&self, price: f64) -> RepoResult<Vec<Pet>>;
}

/// SQLite-backed pet repository.
pub struct SqlitePetRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePetRepository<'conn> {
    /// Wraps a connection without checking its schema.
    ///
    /// Use only with connections returned by `db::open_db*`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps a connection after verifying migrations and the `pets` schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        ensure_pet_schema(conn)?;
        Ok(Self::new(conn))
    }

    fn select(&self, filter: &PetFilter) -> RepoResult<Vec<Pet>> {
        let (sql, binds) = match filter.predicate() {
            Some((clause, binds)) => (
                format!("{PET_SELECT_SQL} WHERE {clause} ORDER BY id ASC;"),
                binds,
            ),
            None => (format!("{PET_SELECT_SQL} ORDER BY id ASC;"), Vec::new()),
        };

        let mut stmt = self.conn.prepare_cached(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut pets = Vec::new();

        while let Some(row) = rows.next()? {
            pets.push(parse_pet_row(row)?);
        }

        Ok(pets)
    }
}

impl PetRepository for SqlitePetRepository<'_> {
    fn insert(&self, draft: &PetDraft) -> RepoResult<Pet> {
        draft.validate()?;
        insert_row(self.conn, draft)
    }

    fn insert_bulk(&self, drafts: &[PetDraft]) -> RepoResult<Vec<Pet>> {
        for draft in drafts {
            draft.validate()?;
        }

        // Dropping `tx` without commit rolls back every row inserted so far.
        let tx = self.conn.unchecked_transaction()?;
        let mut stored = Vec::with_capacity(drafts.len());
        for draft in drafts {
            stored.push(insert_row(&tx, draft)?);
        }
        tx.commit()?;

        Ok(stored)
    }

    fn find_all(&self) -> RepoResult<Vec<Pet>> {
        self.select(&PetFilter::All)
    }

    fn find_by_id(&self, id: PetId) -> RepoResult<Option<Pet>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{PET_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_pet_row(row)?));
        }

        Ok(None)
    }

    fn exists(&self, id: PetId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM pets WHERE id = ?1);",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn update(&self, pet: &Pet) -> RepoResult<()> {
        pet.validate()?;

        let changed = self.conn.execute(
            "UPDATE pets
             SET
                name = ?1,
                species = ?2,
                breed = ?3,
                gender = ?4,
                image = ?5,
                description = ?6,
                price = ?7
             WHERE id = ?8;",
            params![
                pet.name.as_deref(),
                pet.species.as_deref(),
                pet.breed.as_deref(),
                pet.gender.as_deref(),
                pet.image.as_deref(),
                pet.description.as_deref(),
                pet.price,
                pet.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(pet.id));
        }

        Ok(())
    }

    fn delete_by_id(&self, id: PetId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM pets WHERE id = ?1;", params![id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn search_by_keyword(&self, key: &str) -> RepoResult<Vec<Pet>> {
        self.select(&PetFilter::keyword(key))
    }

    fn search_by_max_price(&self, price: f64) -> RepoResult<Vec<Pet>> {
        self.select(&PetFilter::max_price(price)?)
    }
}

fn insert_row(conn: &Connection, draft: &PetDraft) -> RepoResult<Pet> {
    conn.execute(
        "INSERT INTO pets (
            name,
            species,
            breed,
            gender,
            image,
            description,
            price
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            draft.name.as_deref(),
            draft.species.as_deref(),
            draft.breed.as_deref(),
            draft.gender.as_deref(),
            draft.image.as_deref(),
            draft.description.as_deref(),
            draft.price,
        ],
    )?;

    Ok(draft.clone().with_id(conn.last_insert_rowid()))
}

fn parse_pet_row(row: &Row<'_>) -> RepoResult<Pet> {
    let id: PetId = row.get("id")?;
    let price = row.get::<_, Option<f64>>("price")?.ok_or_else(|| {
        RepoError::InvalidData(format!("missing price for pet {id} in pets.price"))
    })?;

    let pet = Pet {
        id,
        name: row.get("name")?,
        species: row.get("species")?,
        breed: row.get("breed")?,
        gender: row.get("gender")?,
        image: row.get("image")?,
        description: row.get("description")?,
        price,
    };
    pet.validate()
        .map_err(|err| RepoError::InvalidData(format!("pet {id}: {err}")))?;
    Ok(pet)
}

fn ensure_pet_schema(conn: &Connection) -> RepoResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let columns = stmt
        .query_map([PET_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<HashSet<_>, _>>()?;

    if columns.is_empty() {
        return Err(RepoError::MissingRequiredTable(PET_TABLE));
    }

    for &column in PET_COLUMNS {
        if !columns.contains(column) {
            return Err(RepoError::MissingRequiredColumn {
                table: PET_TABLE,
                column,
            });
        }
    }

    Ok(())
}

//! School directory with distance-sorted search.
//!
//! [`SchoolService`] validates new schools, stores them through a
//! [`SchoolRepository`], and answers "closest schools first" queries.
//! Every operation also renders the equivalent SQL statement, which is
//! traced at debug level (and its wire packet as a hex dump at trace level).
//!
//! ```ignore
//! use campus::{NewSchool, SchoolServiceBuilder};
//!
//! let service = SchoolServiceBuilder::from_env()?.build();
//! let id = service.add_school(NewSchool::new("Central High", "1 Main St", 12.97, 77.59))?;
//! let nearest = service.list_schools(12.9, 77.6)?;
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::charset::Charset;
use crate::dump::{DumpConfig, DEFAULT_MAX_DUMP_LENGTH};
use crate::error::{CampusError, Result};
use crate::escape::ConnectionContext;
use crate::geo::{distance_km, Coordinate};
use crate::packet::QueryPacket;
use crate::query::format_query;
use crate::value::SqlValue;

/// Longest accepted name or address, in characters.
pub const MAX_FIELD_LEN: usize = 255;

const INSERT_SQL: &str =
    "INSERT INTO schools (name, address, latitude, longitude) VALUES (?, ?, ?, ?)";

const LIST_SQL: &str = "SELECT id, name, address, latitude, longitude, \
     (6371 * ACOS(COS(RADIANS(?)) * COS(RADIANS(latitude)) * COS(RADIANS(longitude) - RADIANS(?)) \
     + SIN(RADIANS(?)) * SIN(RADIANS(latitude)))) AS distance \
     FROM schools ORDER BY distance ASC";

/// A stored school.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    pub id: u64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A school that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSchool {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl NewSchool {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            latitude,
            longitude,
        }
    }

    /// Trim text fields and check every field.
    ///
    /// # Errors
    ///
    /// [`CampusError::InvalidField`] for an empty or overlong name/address,
    /// [`CampusError::InvalidCoordinate`] for an impossible position.
    pub fn validated(self) -> Result<Self> {
        let name = validate_text("name", &self.name)?;
        let address = validate_text("address", &self.address)?;
        Coordinate::new(self.latitude, self.longitude)?;
        Ok(Self {
            name,
            address,
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}

fn validate_text(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CampusError::InvalidField {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    if trimmed.chars().count() > MAX_FIELD_LEN {
        return Err(CampusError::InvalidField {
            field,
            reason: format!("must be at most {} characters", MAX_FIELD_LEN),
        });
    }
    Ok(trimmed.to_string())
}

/// A school together with its distance from a query origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolWithDistance {
    #[serde(flatten)]
    pub school: School,
    /// Distance from the origin in kilometres.
    pub distance: f64,
}

/// Storage backend for schools.
pub trait SchoolRepository: Send + Sync {
    /// Store a school and return its new id.
    fn insert(&self, school: NewSchool) -> Result<u64>;

    /// All stored schools, in insertion order.
    fn all(&self) -> Result<Vec<School>>;

    /// Number of stored schools.
    fn count(&self) -> Result<usize> {
        Ok(self.all()?.len())
    }
}

/// In-process repository. Ids start at 1.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    schools: RwLock<Vec<School>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchoolRepository for MemoryRepository {
    fn insert(&self, school: NewSchool) -> Result<u64> {
        let mut schools = self.schools.write();
        let id = schools.last().map_or(1, |s| s.id + 1);
        schools.push(School {
            id,
            name: school.name,
            address: school.address,
            latitude: school.latitude,
            longitude: school.longitude,
        });
        Ok(id)
    }

    fn all(&self) -> Result<Vec<School>> {
        Ok(self.schools.read().clone())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.schools.read().len())
    }
}

/// Counters describing service usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchoolStats {
    /// Number of stored schools.
    pub schools: usize,
    /// Successful inserts since startup.
    pub inserts: u64,
    /// Distance queries since startup.
    pub queries: u64,
}

/// School directory service.
pub struct SchoolService {
    repository: Arc<dyn SchoolRepository>,
    connection: ConnectionContext,
    dump_config: DumpConfig,
    insert_count: AtomicU64,
    query_count: AtomicU64,
}

impl SchoolService {
    /// Create a service over `repository` with default settings.
    pub fn new(repository: impl SchoolRepository + 'static) -> Self {
        SchoolServiceBuilder::new().repository(repository).build()
    }

    /// Create a builder for more configuration options.
    pub fn builder() -> SchoolServiceBuilder {
        SchoolServiceBuilder::new()
    }

    /// Validate and store a school, returning its id.
    pub fn add_school(&self, school: NewSchool) -> Result<u64> {
        let school = school.validated()?;

        let statement = self.insert_statement(&school)?;
        self.trace_statement(&statement)?;

        let id = self.repository.insert(school)?;
        self.insert_count.fetch_add(1, Ordering::Relaxed);
        tracing::info!(id = id, "School added");
        Ok(id)
    }

    /// All schools, closest to `(lat, lon)` first. Equal distances keep id order.
    pub fn list_schools(&self, lat: f64, lon: f64) -> Result<Vec<SchoolWithDistance>> {
        let origin = Coordinate::new(lat, lon)?;

        let statement = self.list_statement(origin)?;
        self.trace_statement(&statement)?;

        let mut schools: Vec<SchoolWithDistance> = self
            .repository
            .all()?
            .into_iter()
            .filter_map(|school| {
                match Coordinate::new(school.latitude, school.longitude) {
                    Ok(position) => Some(SchoolWithDistance {
                        distance: distance_km(origin, position),
                        school,
                    }),
                    Err(e) => {
                        tracing::warn!(id = school.id, error = %e, "Skipping school with invalid position");
                        None
                    }
                }
            })
            .collect();
        schools.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.school.id.cmp(&b.school.id))
        });

        self.query_count.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(lat = lat, lon = lon, results = schools.len(), "Schools listed");
        Ok(schools)
    }

    /// The INSERT statement equivalent to storing `school`.
    pub fn insert_statement(&self, school: &NewSchool) -> Result<String> {
        let params = [
            SqlValue::from(school.name.as_str()),
            SqlValue::from(school.address.as_str()),
            SqlValue::Float(school.latitude),
            SqlValue::Float(school.longitude),
        ];
        Ok(format_query(&self.connection, INSERT_SQL, &params)?)
    }

    /// The SELECT statement equivalent to a distance query from `origin`.
    pub fn list_statement(&self, origin: Coordinate) -> Result<String> {
        let params = [
            SqlValue::Float(origin.lat()),
            SqlValue::Float(origin.lon()),
            SqlValue::Float(origin.lat()),
        ];
        Ok(format_query(&self.connection, LIST_SQL, &params)?)
    }

    fn trace_statement(&self, statement: &str) -> Result<()> {
        tracing::debug!(statement = statement, "Rendered statement");
        if tracing::enabled!(tracing::Level::TRACE) {
            let packet = QueryPacket::new(0, statement)?;
            tracing::trace!("COM_QUERY packet:\n{}", packet.dump(&self.dump_config));
        }
        Ok(())
    }

    /// Current usage counters.
    pub fn stats(&self) -> Result<SchoolStats> {
        Ok(SchoolStats {
            schools: self.repository.count()?,
            inserts: self.insert_count.load(Ordering::Relaxed),
            queries: self.query_count.load(Ordering::Relaxed),
        })
    }

    pub fn connection(&self) -> &ConnectionContext {
        &self.connection
    }

    pub fn dump_config(&self) -> &DumpConfig {
        &self.dump_config
    }
}

/// Builder for [`SchoolService`].
pub struct SchoolServiceBuilder {
    repository: Option<Arc<dyn SchoolRepository>>,
    charset: Charset,
    dump_config: DumpConfig,
}

impl Default for SchoolServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchoolServiceBuilder {
    /// A builder with an in-memory repository, `utf8mb4`, and a 256-byte dump cap.
    pub fn new() -> Self {
        Self {
            repository: None,
            charset: Charset::default(),
            dump_config: DumpConfig::default(),
        }
    }

    /// Create a builder configured from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `CAMPUS_DEBUG_LEN` | Max bytes in traced packet dumps, `0` = unlimited | 256 |
    /// | `CAMPUS_CHARSET` | Connection charset used for literals | utf8mb4 |
    ///
    /// # Errors
    ///
    /// Returns an error if `CAMPUS_CHARSET` names an unknown charset.
    pub fn from_env() -> Result<Self> {
        let max_dump_length: usize = std::env::var("CAMPUS_DEBUG_LEN")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_MAX_DUMP_LENGTH);

        let charset = match std::env::var("CAMPUS_CHARSET") {
            Ok(name) => Charset::from_name(&name)?,
            Err(_) => Charset::default(),
        };

        Ok(Self {
            repository: None,
            charset,
            dump_config: DumpConfig::new(Some(max_dump_length)),
        })
    }

    /// Use `repository` for storage.
    pub fn repository(mut self, repository: impl SchoolRepository + 'static) -> Self {
        self.repository = Some(Arc::new(repository));
        self
    }

    /// Set the connection charset.
    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Set the packet dump configuration.
    pub fn dump_config(mut self, config: DumpConfig) -> Self {
        self.dump_config = config;
        self
    }

    /// Build the [`SchoolService`].
    pub fn build(self) -> SchoolService {
        let repository = self
            .repository
            .unwrap_or_else(|| Arc::new(MemoryRepository::new()));

        SchoolService {
            repository,
            connection: ConnectionContext::new(self.charset),
            dump_config: self.dump_config,
            insert_count: AtomicU64::new(0),
            query_count: AtomicU64::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> SchoolService {
        SchoolService::new(MemoryRepository::new())
    }

    #[test]
    fn test_add_school_assigns_increasing_ids() {
        let service = service();
        let a = service
            .add_school(NewSchool::new("Alpha", "1 First St", 10.0, 10.0))
            .unwrap();
        let b = service
            .add_school(NewSchool::new("Beta", "2 Second St", 11.0, 11.0))
            .unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[test]
    fn test_add_school_trims_fields() {
        let repo = Arc::new(MemoryRepository::new());
        let service = SchoolService {
            repository: repo.clone(),
            connection: ConnectionContext::default(),
            dump_config: DumpConfig::default(),
            insert_count: AtomicU64::new(0),
            query_count: AtomicU64::new(0),
        };
        service
            .add_school(NewSchool::new("  Alpha ", "\t1 First St\n", 0.0, 0.0))
            .unwrap();
        let stored = repo.all().unwrap();
        assert_eq!(stored[0].name, "Alpha");
        assert_eq!(stored[0].address, "1 First St");
    }

    #[test]
    fn test_add_school_validation() {
        let service = service();

        let err = service
            .add_school(NewSchool::new("   ", "1 First St", 0.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, CampusError::InvalidField { field: "name", .. }));

        let err = service
            .add_school(NewSchool::new("Alpha", "a".repeat(256), 0.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, CampusError::InvalidField { field: "address", .. }));

        let err = service
            .add_school(NewSchool::new("Alpha", "1 First St", 95.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, CampusError::InvalidCoordinate { .. }));

        let err = service
            .add_school(NewSchool::new("Alpha", "1 First St", 0.0, f64::NAN))
            .unwrap_err();
        assert!(matches!(err, CampusError::InvalidCoordinate { .. }));

        assert_eq!(service.stats().unwrap(), SchoolStats::default());
    }

    #[test]
    fn test_list_schools_sorted_by_distance() {
        let service = service();
        service
            .add_school(NewSchool::new("Far", "x", 40.0, 40.0))
            .unwrap();
        service
            .add_school(NewSchool::new("Near", "y", 0.1, 0.1))
            .unwrap();
        service
            .add_school(NewSchool::new("Middle", "z", 5.0, 5.0))
            .unwrap();

        let schools = service.list_schools(0.0, 0.0).unwrap();
        let names: Vec<&str> = schools.iter().map(|s| s.school.name.as_str()).collect();
        assert_eq!(names, ["Near", "Middle", "Far"]);
        assert!(schools.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_list_schools_ties_keep_id_order() {
        let service = service();
        service
            .add_school(NewSchool::new("First", "x", 1.0, 1.0))
            .unwrap();
        service
            .add_school(NewSchool::new("Second", "y", 1.0, 1.0))
            .unwrap();

        let schools = service.list_schools(0.0, 0.0).unwrap();
        assert_eq!(schools[0].school.id, 1);
        assert_eq!(schools[1].school.id, 2);
    }

    #[test]
    fn test_list_schools_invalid_origin() {
        let service = service();
        assert!(matches!(
            service.list_schools(0.0, 200.0),
            Err(CampusError::InvalidCoordinate { .. })
        ));
        assert!(service.list_schools(0.0, 0.0).unwrap().is_empty());
    }

    #[test]
    fn test_stats() {
        let service = service();
        service
            .add_school(NewSchool::new("Alpha", "x", 1.0, 1.0))
            .unwrap();
        service.list_schools(0.0, 0.0).unwrap();
        service.list_schools(1.0, 1.0).unwrap();

        let stats = service.stats().unwrap();
        assert_eq!(stats.schools, 1);
        assert_eq!(stats.inserts, 1);
        assert_eq!(stats.queries, 2);
    }

    #[test]
    fn test_insert_statement() {
        let service = service();
        let school = NewSchool::new("St. Mary's", "5 Church Rd", 12.5, -3.25);
        assert_eq!(
            service.insert_statement(&school).unwrap(),
            "INSERT INTO schools (name, address, latitude, longitude) \
             VALUES ('St. Mary\\'s', '5 Church Rd', 12.5, -3.25)"
        );
    }

    #[test]
    fn test_list_statement() {
        let service = service();
        let statement = service
            .list_statement(Coordinate::new(12.5, 77.25).unwrap())
            .unwrap();
        assert!(statement.contains("COS(RADIANS(12.5))"));
        assert!(statement.contains("RADIANS(77.25)"));
        assert!(statement.contains("SIN(RADIANS(12.5))"));
        assert!(!statement.contains('?'));
    }

    #[test]
    fn test_school_with_distance_serializes_flat() {
        let entry = SchoolWithDistance {
            school: School {
                id: 7,
                name: "Alpha".to_string(),
                address: "x".to_string(),
                latitude: 1.0,
                longitude: 2.0,
            },
            distance: 3.5,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["name"], "Alpha");
        assert_eq!(json["distance"], 3.5);
    }

    #[test]
    fn test_builder_settings() {
        let service = SchoolService::builder()
            .charset(Charset::Big5)
            .dump_config(DumpConfig::unlimited())
            .build();
        assert_eq!(service.connection().charset, Charset::Big5);
        assert_eq!(service.dump_config().max_dump_length(), None);
    }

    // All environment handling lives in one test; the variables are process-wide.
    #[test]
    fn test_from_env() {
        let orig_len = std::env::var("CAMPUS_DEBUG_LEN").ok();
        let orig_charset = std::env::var("CAMPUS_CHARSET").ok();

        std::env::remove_var("CAMPUS_DEBUG_LEN");
        std::env::remove_var("CAMPUS_CHARSET");
        let service = SchoolServiceBuilder::from_env().unwrap().build();
        assert_eq!(service.dump_config().max_dump_length(), Some(256));
        assert_eq!(service.connection().charset, Charset::Utf8mb4);

        std::env::set_var("CAMPUS_DEBUG_LEN", "64");
        std::env::set_var("CAMPUS_CHARSET", "big5");
        let service = SchoolServiceBuilder::from_env().unwrap().build();
        assert_eq!(service.dump_config().max_dump_length(), Some(64));
        assert_eq!(service.connection().charset, Charset::Big5);

        std::env::set_var("CAMPUS_DEBUG_LEN", "0");
        let service = SchoolServiceBuilder::from_env().unwrap().build();
        assert_eq!(service.dump_config().max_dump_length(), None);

        std::env::set_var("CAMPUS_CHARSET", "klingon");
        assert!(SchoolServiceBuilder::from_env().is_err());

        match orig_len {
            Some(v) => std::env::set_var("CAMPUS_DEBUG_LEN", v),
            None => std::env::remove_var("CAMPUS_DEBUG_LEN"),
        }
        match orig_charset {
            Some(v) => std::env::set_var("CAMPUS_CHARSET", v),
            None => std::env::remove_var("CAMPUS_CHARSET"),
        }
    }
}

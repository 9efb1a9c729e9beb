//! Employee record type and field classifications.
//!
//! Records are immutable by convention: constructed once per scenario and
//! never mutated during pipeline evaluation. Equality and hashing are
//! structural over all four fields, with the salary participating via its
//! IEEE-754 bit pattern so that `Eq` and `Hash` stay consistent.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Work status of an employee. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Busy,
    Idle,
    OnLeave,
}

impl Status {
    /// Parse a status keyword as it appears in data files and DSL text.
    pub fn parse(s: &str) -> Option<Status> {
        match s.to_uppercase().as_str() {
            "BUSY" => Some(Status::Busy),
            "IDLE" => Some(Status::Idle),
            "ON_LEAVE" => Some(Status::OnLeave),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Busy => "BUSY",
            Status::Idle => "IDLE",
            Status::OnLeave => "ON_LEAVE",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse age classification used by nested grouping.
///
/// `Young` is age 30 and below, `Middle` is 31 through 50, `Senior` is
/// everything above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeBand {
    Young,
    Middle,
    Senior,
}

impl AgeBand {
    pub fn from_age(age: u32) -> AgeBand {
        if age <= 30 {
            AgeBand::Young
        } else if age <= 50 {
            AgeBand::Middle
        } else {
            AgeBand::Senior
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeBand::Young => "YOUNG",
            AgeBand::Middle => "MIDDLE",
            AgeBand::Senior => "SENIOR",
        }
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An employee record: name, age, salary, status.
#[derive(Debug, Clone)]
pub struct Employee {
    name: String,
    age: u32,
    salary: f64,
    status: Status,
}

impl Employee {
    pub fn new(name: &str, age: u32, salary: f64, status: Status) -> Employee {
        Employee {
            name: name.to_string(),
            age,
            salary,
            status,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn salary(&self) -> f64 {
        self.salary
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn age_band(&self) -> AgeBand {
        AgeBand::from_age(self.age)
    }

    /// Parse one whitespace-separated data line: `name age salary status`.
    ///
    /// Returns a bare message on failure; callers attach line numbers.
    pub fn parse_line(line: &str) -> Result<Employee, String> {
        let mut parts = line.split_whitespace();
        let name = parts.next().ok_or("missing name")?;
        let age: u32 = parts
            .next()
            .ok_or("missing age")?
            .parse()
            .map_err(|_| "invalid age")?;
        let salary: f64 = parts
            .next()
            .ok_or("missing salary")?
            .parse()
            .map_err(|_| "invalid salary")?;
        let status_word = parts.next().ok_or("missing status")?;
        let status = Status::parse(status_word)
            .ok_or("invalid status (expected BUSY, IDLE, or ON_LEAVE)")?;

        if parts.next().is_some() {
            return Err("trailing fields after status".to_string());
        }

        Ok(Employee::new(name, age, salary, status))
    }
}

impl PartialEq for Employee {
    fn eq(&self, other: &Employee) -> bool {
        self.name == other.name
            && self.age == other.age
            && self.salary.to_bits() == other.salary.to_bits()
            && self.status == other.status
    }
}

impl Eq for Employee {}

impl Hash for Employee {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.age.hash(state);
        self.salary.to_bits().hash(state);
        self.status.hash(state);
    }
}

impl fmt::Display for Employee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {:.2} {}",
            self.name, self.age, self.salary, self.status
        )
    }
}

//! DSL parser and executor for pipeline commands.
//!
//! Pipeline format (CMS Pipelines style):
//! ```text
//! PIPE CONSOLE
//! | FILTER SALARY > 5000
//! | SORT AGE, NAME
//! | CONSOLE
//! ?
//! ```
//!
//! - `PIPE CONSOLE` starts pipeline, reading from input
//! - `| <stage>` continues to next stage
//! - `| CONSOLE` writes to output
//! - `?` on its own line marks end of pipeline
//!
//! Stage position rules:
//! - First stage must be a source: CONSOLE, LITERAL, or HOLE
//! - Summary stages (COUNT, SUM, STATS, MIN, MAX, GROUP) consume the whole
//!   stream and emit text, so they must be the last stage
//! - Any other stage can appear anywhere (CONSOLE passes through in the
//!   middle)
//!
//! Supported stages:
//! - `CONSOLE` - Read from input (first), pass through (middle), or write to
//!   output (last)
//! - `LITERAL name age salary status` - Inject one record ahead of the stream
//! - `HOLE` - Discard all input, output nothing (like /dev/null)
//! - `FILTER <field> <op> <value>` - Keep records matching the comparison;
//!   fields are NAME, AGE, SALARY, STATUS; ops are =, !=, >, >=, <, <=
//!   (relational ops apply to AGE and SALARY only)
//! - `LOCATE /pattern/` - Keep records whose name contains pattern
//! - `NLOCATE /pattern/` - Keep records whose name does NOT contain pattern
//! - `DISTINCT` - Drop duplicate records, keeping first occurrences
//! - `SORT <field>[, <field>...]` - Stable ascending sort; later fields
//!   break ties
//! - `TAKE n` - Keep first n records
//! - `SKIP n` - Skip first n records
//! - `COUNT` - Emit "COUNT=n"
//! - `SUM AGE|SALARY` - Emit "SUM=x"
//! - `STATS AGE|SALARY` - Emit count/sum/mean/min/max summary lines
//! - `MIN AGE|SALARY` / `MAX AGE|SALARY` - Emit the extremal record, or
//!   "NO VALUE" when the stream is empty
//! - `GROUP STATUS [AGEBAND]` - Emit records grouped by status, optionally
//!   sub-grouped by age band
//! - Lines starting with `#` are comments

use std::cmp::Ordering;

use crate::Pipeline;
use crate::error::PipelineError;
use crate::record::{AgeBand, Employee, Status};

/// A record field addressable from the DSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Age,
    Salary,
    Status,
}

impl Field {
    fn parse(token: &str) -> Result<Field, String> {
        match token.to_uppercase().as_str() {
            "NAME" => Ok(Field::Name),
            "AGE" => Ok(Field::Age),
            "SALARY" => Ok(Field::Salary),
            "STATUS" => Ok(Field::Status),
            other => Err(format!("unknown field: {other}")),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Field::Name => "NAME",
            Field::Age => "AGE",
            Field::Salary => "SALARY",
            Field::Status => "STATUS",
        }
    }
}

/// A numeric field usable with SUM, STATS, MIN, and MAX.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumField {
    Age,
    Salary,
}

impl NumField {
    fn parse(token: &str) -> Result<NumField, String> {
        match token.to_uppercase().as_str() {
            "AGE" => Ok(NumField::Age),
            "SALARY" => Ok(NumField::Salary),
            other => Err(format!("expected AGE or SALARY, got: {other}")),
        }
    }

    fn value_of(&self, e: &Employee) -> f64 {
        match self {
            NumField::Age => e.age() as f64,
            NumField::Salary => e.salary(),
        }
    }
}

/// Comparison operator in a FILTER stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl FilterOp {
    fn parse(token: &str) -> Result<FilterOp, String> {
        match token {
            "=" => Ok(FilterOp::Eq),
            "!=" => Ok(FilterOp::Ne),
            ">" => Ok(FilterOp::Gt),
            ">=" => Ok(FilterOp::Ge),
            "<" => Ok(FilterOp::Lt),
            "<=" => Ok(FilterOp::Le),
            other => Err(format!("unknown operator: {other}")),
        }
    }

    fn is_relational(&self) -> bool {
        matches!(
            self,
            FilterOp::Gt | FilterOp::Ge | FilterOp::Lt | FilterOp::Le
        )
    }
}

/// Right-hand side of a FILTER comparison, typed per field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Number(f64),
    Text(String),
    Status(Status),
}

/// Parsed pipeline command.
#[derive(Debug, Clone)]
pub enum Command {
    /// CONSOLE - Read from input or write to output
    Console,
    /// LITERAL name age salary status - inject one record
    Literal { employee: Employee },
    /// HOLE - discard all input, output nothing
    Hole,
    /// FILTER field op value
    Filter {
        field: Field,
        op: FilterOp,
        value: FilterValue,
    },
    /// LOCATE /pattern/ - keep records whose name contains pattern
    Locate { pattern: String },
    /// NLOCATE /pattern/ - keep records whose name does NOT contain pattern
    Nlocate { pattern: String },
    /// DISTINCT - drop duplicates, keep first occurrences
    Distinct,
    /// SORT field[, field...]
    Sort { keys: Vec<Field> },
    /// TAKE n
    Take { n: usize },
    /// SKIP n
    Skip { n: usize },
    /// COUNT - emit record count
    Count,
    /// SUM field - emit sum of a numeric field
    Sum { field: NumField },
    /// STATS field - emit numeric summary of a field
    Stats { field: NumField },
    /// MIN field - emit the record with the smallest field value
    Min { field: NumField },
    /// MAX field - emit the record with the largest field value
    Max { field: NumField },
    /// GROUP STATUS [AGEBAND] - emit grouped records
    Group { by_age_band: bool },
}

impl Command {
    /// Can this stage be the first stage in a pipeline (source)?
    /// Sources generate or read records without needing upstream input.
    pub fn can_be_first(&self) -> bool {
        matches!(
            self,
            Command::Console | Command::Literal { .. } | Command::Hole
        )
    }

    /// Does this stage consume the whole stream and emit summary text?
    /// Summary stages must be the last stage of a pipeline.
    pub fn is_summary(&self) -> bool {
        matches!(
            self,
            Command::Count
                | Command::Sum { .. }
                | Command::Stats { .. }
                | Command::Min { .. }
                | Command::Max { .. }
                | Command::Group { .. }
        )
    }

    /// Get the stage name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Console => "CONSOLE",
            Command::Literal { .. } => "LITERAL",
            Command::Hole => "HOLE",
            Command::Filter { .. } => "FILTER",
            Command::Locate { .. } => "LOCATE",
            Command::Nlocate { .. } => "NLOCATE",
            Command::Distinct => "DISTINCT",
            Command::Sort { .. } => "SORT",
            Command::Take { .. } => "TAKE",
            Command::Skip { .. } => "SKIP",
            Command::Count => "COUNT",
            Command::Sum { .. } => "SUM",
            Command::Stats { .. } => "STATS",
            Command::Min { .. } => "MIN",
            Command::Max { .. } => "MAX",
            Command::Group { .. } => "GROUP",
        }
    }
}

/// Parse DSL text into commands.
pub fn parse_commands(text: &str) -> Result<Vec<Command>, PipelineError> {
    let mut commands = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Handle "PIPE COMMAND" - extract command after PIPE
        let line = if line.to_uppercase().starts_with("PIPE ") {
            line[5..].trim()
        } else if line.eq_ignore_ascii_case("PIPE") {
            // Skip standalone PIPE declaration
            continue;
        } else {
            line
        };

        // Handle continuation lines: "| COMMAND ..."
        let line = if let Some(stripped) = line.strip_prefix('|') {
            stripped.trim()
        } else {
            line
        };

        // Remove trailing ? (explicit end of pipeline)
        let line = line.trim_end_matches('?').trim();

        if line.is_empty() {
            continue;
        }

        let cmd = parse_command(line).map_err(|msg| PipelineError::Parse {
            line: line_num + 1,
            msg,
        })?;
        commands.push(cmd);
    }

    Ok(commands)
}

/// Parse a single command line.
fn parse_command(line: &str) -> Result<Command, String> {
    let upper = line.to_uppercase();

    if upper == "CONSOLE" || upper.starts_with("CONSOLE ") {
        Ok(Command::Console)
    } else if upper.starts_with("LITERAL") {
        parse_literal(line)
    } else if upper == "HOLE" || upper.starts_with("HOLE ") {
        Ok(Command::Hole)
    } else if upper.starts_with("FILTER") {
        parse_filter(line)
    } else if upper.starts_with("NLOCATE") {
        let (pattern, _) = parse_delimited_string(line[7..].trim())?;
        Ok(Command::Nlocate { pattern })
    } else if upper.starts_with("LOCATE") {
        let (pattern, _) = parse_delimited_string(line[6..].trim())?;
        Ok(Command::Locate { pattern })
    } else if upper == "DISTINCT" || upper.starts_with("DISTINCT ") {
        Ok(Command::Distinct)
    } else if upper.starts_with("SORT") {
        parse_sort(line)
    } else if upper.starts_with("TAKE") {
        let n = parse_count_arg(line[4..].trim(), "TAKE")?;
        Ok(Command::Take { n })
    } else if upper.starts_with("SKIP") {
        let n = parse_count_arg(line[4..].trim(), "SKIP")?;
        Ok(Command::Skip { n })
    } else if upper == "COUNT" || upper.starts_with("COUNT ") {
        Ok(Command::Count)
    } else if upper.starts_with("SUM") {
        let field = NumField::parse(line[3..].trim())?;
        Ok(Command::Sum { field })
    } else if upper.starts_with("STATS") {
        let field = NumField::parse(line[5..].trim())?;
        Ok(Command::Stats { field })
    } else if upper.starts_with("MIN") {
        let field = NumField::parse(line[3..].trim())?;
        Ok(Command::Min { field })
    } else if upper.starts_with("MAX") {
        let field = NumField::parse(line[3..].trim())?;
        Ok(Command::Max { field })
    } else if upper.starts_with("GROUP") {
        parse_group(line)
    } else {
        Err(format!(
            "Unknown command: {}",
            line.split_whitespace().next().unwrap_or(line)
        ))
    }
}

/// Parse FILTER command: `FILTER <field> <op> <value>`.
fn parse_filter(line: &str) -> Result<Command, String> {
    let rest = line[6..].trim(); // Skip "FILTER"

    let mut parts = rest.split_whitespace();
    let field = Field::parse(parts.next().ok_or("FILTER requires a field")?)?;
    let op = FilterOp::parse(parts.next().ok_or("FILTER requires an operator")?)?;
    let value_token = parts.next().ok_or("FILTER requires a value")?;
    if parts.next().is_some() {
        return Err("FILTER takes a single value".to_string());
    }

    if op.is_relational() && !matches!(field, Field::Age | Field::Salary) {
        return Err(format!(
            "relational operators require AGE or SALARY, not {}",
            field.name()
        ));
    }

    let value = match field {
        Field::Name => FilterValue::Text(value_token.to_string()),
        Field::Age | Field::Salary => {
            let n: f64 = value_token
                .parse()
                .map_err(|_| format!("invalid number: {value_token}"))?;
            FilterValue::Number(n)
        }
        Field::Status => {
            let status = Status::parse(value_token)
                .ok_or_else(|| format!("invalid status: {value_token}"))?;
            FilterValue::Status(status)
        }
    };

    Ok(Command::Filter { field, op, value })
}

/// Parse SORT command: `SORT field[, field...]`.
fn parse_sort(line: &str) -> Result<Command, String> {
    let rest = line[4..].trim(); // Skip "SORT"

    let mut keys = Vec::new();
    for token in rest.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        keys.push(Field::parse(token)?);
    }

    if keys.is_empty() {
        return Err("SORT requires at least one field".to_string());
    }

    Ok(Command::Sort { keys })
}

/// Parse LITERAL command: everything after "LITERAL" is a record line.
fn parse_literal(line: &str) -> Result<Command, String> {
    let rest = line[7..].trim();
    if rest.is_empty() {
        return Err("LITERAL requires a record (name age salary status)".to_string());
    }
    let employee = Employee::parse_line(rest)?;
    Ok(Command::Literal { employee })
}

/// Parse GROUP command: `GROUP STATUS` or `GROUP STATUS AGEBAND`.
fn parse_group(line: &str) -> Result<Command, String> {
    let rest = line[5..].trim();
    let mut parts = rest.split_whitespace();

    match parts.next().map(str::to_uppercase).as_deref() {
        Some("STATUS") => {}
        _ => return Err("GROUP requires STATUS as the primary key".to_string()),
    }

    let by_age_band = match parts.next().map(str::to_uppercase).as_deref() {
        None => false,
        Some("AGEBAND") => true,
        Some(other) => return Err(format!("unknown GROUP sub-key: {other}")),
    };

    if parts.next().is_some() {
        return Err("GROUP takes at most two keys".to_string());
    }

    Ok(Command::Group { by_age_band })
}

/// Parse a numeric stage argument (TAKE n, SKIP n).
fn parse_count_arg(rest: &str, stage: &str) -> Result<usize, String> {
    rest.parse().map_err(|_| format!("{stage} requires a number"))
}

/// Parse a delimited string using CMS Pipelines convention.
/// The first non-blank character is the delimiter, and the string
/// continues until the next occurrence of that delimiter.
/// Returns (extracted_string, rest_of_input).
fn parse_delimited_string(s: &str) -> Result<(String, &str), String> {
    let s = s.trim_start();
    if s.is_empty() {
        return Err("Expected delimited string".to_string());
    }

    // First character is the delimiter
    let delim = s.chars().next().unwrap();
    let after_delim = &s[delim.len_utf8()..];

    // Find the closing delimiter
    if let Some(end) = after_delim.find(delim) {
        let extracted = after_delim[..end].to_string();
        let rest = &after_delim[end + delim.len_utf8()..];
        Ok((extracted, rest))
    } else {
        Err(format!("Unclosed delimiter '{}'", delim))
    }
}

/// Compare two records on one field, ascending.
fn compare_by(a: &Employee, b: &Employee, field: Field) -> Ordering {
    match field {
        Field::Name => a.name().cmp(b.name()),
        Field::Age => a.age().cmp(&b.age()),
        Field::Salary => a.salary().total_cmp(&b.salary()),
        Field::Status => a.status().as_str().cmp(b.status().as_str()),
    }
}

/// Evaluate a FILTER comparison against one record.
///
/// Field/value pairings are enforced at parse time, so mismatched pairs
/// cannot occur here.
fn filter_matches(e: &Employee, field: Field, op: FilterOp, value: &FilterValue) -> bool {
    match (field, value) {
        (Field::Name, FilterValue::Text(text)) => match op {
            FilterOp::Eq => e.name() == text,
            FilterOp::Ne => e.name() != text,
            _ => false,
        },
        (Field::Status, FilterValue::Status(status)) => match op {
            FilterOp::Eq => e.status() == *status,
            FilterOp::Ne => e.status() != *status,
            _ => false,
        },
        (Field::Age, FilterValue::Number(n)) => compare_num(e.age() as f64, *n, op),
        (Field::Salary, FilterValue::Number(n)) => compare_num(e.salary(), *n, op),
        _ => false,
    }
}

fn compare_num(lhs: f64, rhs: f64, op: FilterOp) -> bool {
    match op {
        FilterOp::Eq => lhs == rhs,
        FilterOp::Ne => lhs != rhs,
        FilterOp::Gt => lhs > rhs,
        FilterOp::Ge => lhs >= rhs,
        FilterOp::Lt => lhs < rhs,
        FilterOp::Le => lhs <= rhs,
    }
}

/// Execute a pipeline defined by DSL text on input records.
///
/// Returns (output_text, input_count, output_count) on success.
pub fn execute_pipeline(
    input_text: &str,
    pipeline_text: &str,
) -> Result<(String, usize, usize), PipelineError> {
    let commands = parse_commands(pipeline_text)?;

    if commands.is_empty() {
        return Err(PipelineError::EmptyPipeline);
    }

    // Need at least 2 stages (source and something to receive output)
    if commands.len() < 2 {
        return Err(PipelineError::TooFewStages);
    }

    let first = &commands[0];
    if !first.can_be_first() {
        return Err(PipelineError::NotASource {
            stage: first.name(),
        });
    }

    // Summary stages drain the stream, so nothing may follow them
    for cmd in &commands[..commands.len() - 1] {
        if cmd.is_summary() {
            return Err(PipelineError::SummaryNotLast { stage: cmd.name() });
        }
    }

    // Get initial records based on first stage type
    let input_records = read_source(input_text, first)?;
    let input_count = input_records.len();

    // commands.len() >= 2, so there is always a last stage after the source
    let (last, middle) = commands[1..]
        .split_last()
        .ok_or(PipelineError::TooFewStages)?;

    let mut current = input_records;
    for cmd in middle {
        current = apply_command(current, cmd);
    }

    let output_lines: Vec<String> = if last.is_summary() {
        render_summary(current, last)
    } else {
        apply_command(current, last)
            .iter()
            .map(|e| e.to_string())
            .collect()
    };

    let output_count = output_lines.len();
    Ok((output_lines.join("\n"), input_count, output_count))
}

/// Materialize the initial record stream from the source stage.
fn read_source(input_text: &str, source: &Command) -> Result<Vec<Employee>, PipelineError> {
    match source {
        Command::Console => {
            // CONSOLE reads one record per non-empty input line
            let mut records = Vec::new();
            for (line_num, line) in input_text.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let emp = Employee::parse_line(line).map_err(|msg| PipelineError::BadRecord {
                    line: line_num + 1,
                    msg,
                })?;
                records.push(emp);
            }
            Ok(records)
        }
        Command::Literal { employee } => Ok(vec![employee.clone()]),
        Command::Hole => Ok(vec![]),
        // can_be_first was checked by the caller
        other => Err(PipelineError::NotASource {
            stage: other.name(),
        }),
    }
}

/// Apply a single non-summary command to records.
fn apply_command(records: Vec<Employee>, cmd: &Command) -> Vec<Employee> {
    match cmd {
        // Console in the middle of a pipeline just passes through
        Command::Console => records,
        Command::Literal { employee } => {
            // LITERAL is a prefix stage: its record comes first, then the
            // input stream passes through
            let mut result = vec![employee.clone()];
            result.extend(records);
            result
        }
        Command::Hole => vec![],
        Command::Filter { field, op, value } => {
            let field = *field;
            let op = *op;
            let value = value.clone();
            Pipeline::from_vec(records)
                .filter(move |e| filter_matches(e, field, op, &value))
                .collect()
        }
        Command::Locate { pattern } => {
            let pattern = pattern.clone();
            Pipeline::from_vec(records)
                .filter(move |e| e.name().contains(pattern.as_str()))
                .collect()
        }
        Command::Nlocate { pattern } => {
            let pattern = pattern.clone();
            Pipeline::from_vec(records)
                .filter(move |e| !e.name().contains(pattern.as_str()))
                .collect()
        }
        Command::Distinct => Pipeline::from_vec(records).distinct().collect(),
        Command::Sort { keys } => {
            let keys = keys.clone();
            Pipeline::from_vec(records)
                .sorted_by(move |a, b| {
                    keys.iter().fold(Ordering::Equal, |ord, field| {
                        ord.then_with(|| compare_by(a, b, *field))
                    })
                })
                .collect()
        }
        Command::Take { n } => Pipeline::from_vec(records).limit(*n).collect(),
        Command::Skip { n } => Pipeline::from_vec(records).skip(*n).collect(),
        // Summary commands are routed to render_summary by the executor
        _ => records,
    }
}

/// Render a summary stage over the final record stream.
fn render_summary(records: Vec<Employee>, cmd: &Command) -> Vec<String> {
    match cmd {
        Command::Count => vec![format!("COUNT={}", records.len())],
        Command::Sum { field } => {
            let field = *field;
            let sum = Pipeline::from_vec(records)
                .map(move |e| field.value_of(&e))
                .reduce(0.0, |x, y| x + y);
            vec![format!("SUM={sum:.2}")]
        }
        Command::Stats { field } => {
            let field = *field;
            let summary = Pipeline::from_vec(records).summarize(move |e| field.value_of(e));
            let mut lines = vec![
                format!("COUNT={}", summary.count()),
                format!("SUM={:.2}", summary.sum()),
                format!("MEAN={:.2}", summary.mean()),
            ];
            if summary.count() == 0 {
                lines.push("MIN=NO VALUE".to_string());
                lines.push("MAX=NO VALUE".to_string());
            } else {
                lines.push(format!("MIN={:.2}", summary.min()));
                lines.push(format!("MAX={:.2}", summary.max()));
            }
            lines
        }
        Command::Min { field } => {
            let field = *field;
            let min = Pipeline::from_vec(records)
                .min_by(move |a, b| field.value_of(a).total_cmp(&field.value_of(b)));
            vec![render_extremal(min)]
        }
        Command::Max { field } => {
            let field = *field;
            let max = Pipeline::from_vec(records)
                .max_by(move |a, b| field.value_of(a).total_cmp(&field.value_of(b)));
            vec![render_extremal(max)]
        }
        Command::Group { by_age_band: false } => {
            let groups = Pipeline::from_vec(records).group_by(|e| e.status());
            let mut lines = Vec::new();
            for status in [Status::Busy, Status::Idle, Status::OnLeave] {
                if let Some(members) = groups.get(&status) {
                    lines.push(format!("{status}:"));
                    for e in members {
                        lines.push(format!("  {e}"));
                    }
                }
            }
            lines
        }
        Command::Group { by_age_band: true } => {
            let groups =
                Pipeline::from_vec(records).group_by_nested(|e| e.status(), |e| e.age_band());
            let mut lines = Vec::new();
            for status in [Status::Busy, Status::Idle, Status::OnLeave] {
                if let Some(bands) = groups.get(&status) {
                    lines.push(format!("{status}:"));
                    for band in [AgeBand::Young, AgeBand::Middle, AgeBand::Senior] {
                        if let Some(members) = bands.get(&band) {
                            lines.push(format!("  {band}:"));
                            for e in members {
                                lines.push(format!("    {e}"));
                            }
                        }
                    }
                }
            }
            lines
        }
        // Non-summary commands never reach here
        _ => vec![],
    }
}

/// Absent-value marker for MIN/MAX over an empty stream.
fn render_extremal(result: Option<Employee>) -> String {
    match result {
        Some(e) => e.to_string(),
        None => "NO VALUE".to_string(),
    }
}

use crate::api::models::{ContactFlow, HoursOfOperation, InstanceDetail, PhoneNumber, Queue, User};
use crate::core::snapshot::{CollectionResult, Diagnostic, InstanceRecord, Snapshot};
use crate::error::AppError;
use crate::utils::text::truncate_text_unicode;
use comfy_table::{Attribute, Cell, Color, Table, presets};
use crossterm::terminal;
use std::collections::BTreeMap;

/// Formatter for snapshot display
pub struct TableDisplay {
    max_width: Option<usize>,
    use_colors: bool,
}

impl TableDisplay {
    /// Create a new TableDisplay instance
    pub fn new() -> Self {
        Self {
            max_width: Self::detect_terminal_width(),
            use_colors: true,
        }
    }

    /// Detect terminal width
    fn detect_terminal_width() -> Option<usize> {
        match terminal::size() {
            Ok((cols, _rows)) => {
                let width = cols as usize;
                // Clamp for stability on tiny or very wide terminals
                if width < 40 {
                    Some(40)
                } else if width > 200 {
                    Some(200)
                } else {
                    Some(width)
                }
            }
            Err(_) => Some(80),
        }
    }

    /// Create a TableDisplay instance with maximum width setting
    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Set color usage
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Render the full snapshot: header, per-instance sections, totals,
    /// and a closing list of everything that failed along the way.
    pub fn render_snapshot(&self, snapshot: &Snapshot) -> Result<String, AppError> {
        let mut output = String::new();

        output.push_str(&self.render_snapshot_header(snapshot));

        if snapshot.instances.is_empty() {
            output.push_str("No Connect instances found in this region.\n");
            return Ok(output);
        }

        output.push_str(&self.render_instance_overview(&snapshot.instances)?);
        output.push('\n');

        for record in &snapshot.instances {
            output.push_str(&self.render_instance_section(record)?);
            output.push('\n');
        }

        output.push_str(&self.render_totals(snapshot)?);

        let diagnostics = Self::collect_diagnostics(&snapshot.instances);
        if !diagnostics.is_empty() {
            output.push('\n');
            output.push_str(&self.render_diagnostics(&diagnostics)?);
        }

        Ok(output)
    }

    fn render_snapshot_header(&self, snapshot: &Snapshot) -> String {
        let mut header = String::new();
        header.push_str(&format!(
            "Connect inventory for {} collected at {}\n",
            snapshot.region,
            snapshot.collected_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        if snapshot.partial {
            header.push_str("Note: collection was cancelled early; this snapshot is partial.\n");
        }

        let terminal_width = self.max_width.unwrap_or(80);
        let separator = "─".repeat(terminal_width.min(80));
        header.push_str(&format!("{}\n", separator));
        header
    }

    /// One row per instance with per-kind counts; failed listings show
    /// "err" instead of masquerading as zero.
    pub fn render_instance_overview(&self, records: &[InstanceRecord]) -> Result<String, AppError> {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
        self.configure_table_width(&mut table);

        self.set_styled_header(
            &mut table,
            &[
                "Alias", "ID", "Status", "Queues", "Users", "Flows", "Numbers", "Hours",
            ],
        );

        for record in records {
            let row = vec![
                self.name_cell(record.summary.display_name()),
                Cell::new(record.summary.instance_id().unwrap_or("-")),
                Cell::new(record.summary.instance_status.as_deref().unwrap_or("-")),
                self.count_cell(&record.queues),
                self.count_cell(&record.users),
                self.count_cell(&record.contact_flows),
                self.count_cell(&record.phone_numbers),
                self.count_cell(&record.hours_of_operations),
            ];
            table.add_row(row);
        }

        Ok(table.to_string())
    }

    fn render_instance_section(&self, record: &InstanceRecord) -> Result<String, AppError> {
        let mut output = String::new();
        output.push_str(&format!(
            "Instance: {} ({})\n",
            record.summary.display_name(),
            record.summary.instance_id().unwrap_or("unknown id")
        ));

        match &record.details {
            CollectionResult::Ok { value } => {
                output.push_str(&self.render_instance_details(value)?);
            }
            CollectionResult::Err { error } => {
                output.push_str(&self.failure_line("details", error));
            }
        }

        output.push_str(&self.render_listing("Queues", &record.queues, |table, queues: &Vec<Queue>| {
            self.set_styled_header(table, &["Name", "Type", "ID"]);
            for queue in queues {
                table.add_row(vec![
                    self.name_cell(queue.name.as_deref().unwrap_or("-")),
                    Cell::new(queue.queue_type.as_deref().unwrap_or("-")),
                    Cell::new(queue.id.as_deref().unwrap_or("-")),
                ]);
            }
        })?);

        output.push_str(&self.render_listing("Users", &record.users, |table, users: &Vec<User>| {
            self.set_styled_header(table, &["Username", "ID"]);
            for user in users {
                table.add_row(vec![
                    self.name_cell(user.username.as_deref().unwrap_or("-")),
                    Cell::new(user.id.as_deref().unwrap_or("-")),
                ]);
            }
        })?);

        output.push_str(&self.render_contact_flows(&record.contact_flows)?);

        output.push_str(&self.render_listing(
            "Phone numbers",
            &record.phone_numbers,
            |table, numbers: &Vec<PhoneNumber>| {
                self.set_styled_header(table, &["Number", "Type", "Country"]);
                for number in numbers {
                    table.add_row(vec![
                        self.name_cell(number.phone_number.as_deref().unwrap_or("-")),
                        Cell::new(number.phone_number_type.as_deref().unwrap_or("-")),
                        Cell::new(number.phone_number_country_code.as_deref().unwrap_or("-")),
                    ]);
                }
            },
        )?);

        output.push_str(&self.render_listing(
            "Hours of operation",
            &record.hours_of_operations,
            |table, hours: &Vec<HoursOfOperation>| {
                self.set_styled_header(table, &["Name", "ID"]);
                for entry in hours {
                    table.add_row(vec![
                        self.name_cell(entry.name.as_deref().unwrap_or("-")),
                        Cell::new(entry.id.as_deref().unwrap_or("-")),
                    ]);
                }
            },
        )?);

        Ok(output)
    }

    /// Render instance details in a two-column Field | Value layout.
    pub fn render_instance_details(&self, detail: &InstanceDetail) -> Result<String, AppError> {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
        self.configure_table_width(&mut table);

        self.set_styled_header(&mut table, &["Field", "Value"]);

        let flag = |value: Option<bool>| match value {
            Some(true) => "enabled".to_string(),
            Some(false) => "disabled".to_string(),
            None => "-".to_string(),
        };

        let fields = vec![
            ("Status", detail.instance_status.clone().unwrap_or_else(|| "-".to_string())),
            (
                "Identity management",
                detail
                    .identity_management_type
                    .clone()
                    .unwrap_or_else(|| "-".to_string()),
            ),
            (
                "Access URL",
                detail
                    .instance_access_url
                    .clone()
                    .unwrap_or_else(|| "-".to_string()),
            ),
            ("Inbound calls", flag(detail.inbound_calls_enabled)),
            ("Outbound calls", flag(detail.outbound_calls_enabled)),
            (
                "Created",
                detail
                    .created_time
                    .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            (
                "Service role",
                detail
                    .service_role
                    .as_deref()
                    .map(|arn| truncate_text_unicode(arn, 60))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ];

        for (field_name, field_value) in fields {
            let row = vec![
                if self.use_colors {
                    Cell::new(field_name).fg(Color::Yellow)
                } else {
                    Cell::new(field_name)
                },
                Cell::new(field_value),
            ];
            table.add_row(row);
        }

        Ok(format!("{}\n", table))
    }

    /// Contact flows are grouped by type, with active flows marked.
    fn render_contact_flows(
        &self,
        result: &CollectionResult<Vec<ContactFlow>>,
    ) -> Result<String, AppError> {
        let flows = match result {
            CollectionResult::Ok { value } => value,
            CollectionResult::Err { error } => {
                return Ok(self.failure_line("Contact flows", error));
            }
        };

        if flows.is_empty() {
            return Ok("  Contact flows: none\n".to_string());
        }

        let mut by_type: BTreeMap<&str, Vec<&ContactFlow>> = BTreeMap::new();
        for flow in flows {
            by_type
                .entry(flow.contact_flow_type.as_deref().unwrap_or("UNKNOWN"))
                .or_default()
                .push(flow);
        }

        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
        self.configure_table_width(&mut table);
        self.set_styled_header(&mut table, &["Type", "Name", "State"]);

        for (flow_type, group) in &by_type {
            for flow in group {
                let state = if flow.is_active() {
                    "active"
                } else {
                    flow.contact_flow_state.as_deref().unwrap_or("-")
                };
                table.add_row(vec![
                    Cell::new(*flow_type),
                    self.name_cell(flow.name.as_deref().unwrap_or("-")),
                    if self.use_colors && flow.is_active() {
                        Cell::new(state).fg(Color::Green)
                    } else {
                        Cell::new(state)
                    },
                ]);
            }
        }

        Ok(format!("  Contact flows ({} types):\n{}\n", by_type.len(), table))
    }

    fn render_listing<T, F>(
        &self,
        title: &str,
        result: &CollectionResult<Vec<T>>,
        fill: F,
    ) -> Result<String, AppError>
    where
        F: FnOnce(&mut Table, &Vec<T>),
    {
        let items = match result {
            CollectionResult::Ok { value } => value,
            CollectionResult::Err { error } => return Ok(self.failure_line(title, error)),
        };

        if items.is_empty() {
            return Ok(format!("  {}: none\n", title));
        }

        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
        self.configure_table_width(&mut table);
        fill(&mut table, items);

        Ok(format!("  {} ({}):\n{}\n", title, items.len(), table))
    }

    /// Render the per-kind totals summary.
    pub fn render_totals(&self, snapshot: &Snapshot) -> Result<String, AppError> {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
        self.configure_table_width(&mut table);

        self.set_styled_header(
            &mut table,
            &[
                "Instances",
                "Queues",
                "Users",
                "Contact flows",
                "Phone numbers",
                "Hours of operation",
            ],
        );

        let totals = &snapshot.totals;
        table.add_row(vec![
            Cell::new(totals.instances.to_string()),
            Cell::new(totals.queues.to_string()),
            Cell::new(totals.users.to_string()),
            Cell::new(totals.contact_flows.to_string()),
            Cell::new(totals.phone_numbers.to_string()),
            Cell::new(totals.hours_of_operations.to_string()),
        ]);

        Ok(format!("Totals:\n{}\n", table))
    }

    /// List every diagnostic recorded in the snapshot.
    pub fn render_diagnostics(&self, diagnostics: &[&Diagnostic]) -> Result<String, AppError> {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
        self.configure_table_width(&mut table);

        self.set_styled_header(&mut table, &["Resource", "Instance", "Cause"]);

        for diagnostic in diagnostics {
            table.add_row(vec![
                Cell::new(diagnostic.kind.label()),
                Cell::new(diagnostic.instance_id.as_deref().unwrap_or("-")),
                if self.use_colors {
                    Cell::new(truncate_text_unicode(&diagnostic.cause, 80)).fg(Color::Red)
                } else {
                    Cell::new(truncate_text_unicode(&diagnostic.cause, 80))
                },
            ]);
        }

        Ok(format!(
            "Failed sub-queries ({}):\n{}\n",
            diagnostics.len(),
            table
        ))
    }

    fn collect_diagnostics(records: &[InstanceRecord]) -> Vec<&Diagnostic> {
        let mut diagnostics = Vec::new();
        for record in records {
            let fields: [Option<&Diagnostic>; 6] = [
                record.details.diagnostic(),
                record.queues.diagnostic(),
                record.users.diagnostic(),
                record.contact_flows.diagnostic(),
                record.phone_numbers.diagnostic(),
                record.hours_of_operations.diagnostic(),
            ];
            diagnostics.extend(fields.into_iter().flatten());
        }
        diagnostics
    }

    fn failure_line(&self, title: &str, diagnostic: &Diagnostic) -> String {
        format!(
            "  {}: unavailable ({})\n",
            title,
            truncate_text_unicode(&diagnostic.cause, 80)
        )
    }

    fn set_styled_header(&self, table: &mut Table, headers: &[&str]) {
        if self.use_colors {
            let cells: Vec<Cell> = headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold).fg(Color::Cyan))
                .collect();
            table.set_header(cells);
        } else {
            let cells: Vec<Cell> = headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect();
            table.set_header(cells);
        }
    }

    fn name_cell(&self, name: &str) -> Cell {
        let truncated = truncate_text_unicode(name, 40);
        if self.use_colors {
            Cell::new(truncated).fg(Color::Cyan)
        } else {
            Cell::new(truncated)
        }
    }

    fn count_cell<T>(&self, result: &CollectionResult<Vec<T>>) -> Cell {
        match result {
            CollectionResult::Ok { value } => Cell::new(value.len().to_string()),
            CollectionResult::Err { .. } => {
                if self.use_colors {
                    Cell::new("err").fg(Color::Red)
                } else {
                    Cell::new("err")
                }
            }
        }
    }

    /// Set table width to match the terminal size
    fn configure_table_width(&self, table: &mut Table) {
        if let Some(terminal_width) = self.max_width {
            let available_width = if terminal_width > 20 {
                terminal_width - 6
            } else {
                terminal_width.max(40)
            };

            table.set_width(available_width as u16);
        } else {
            table.set_width(80);
        }
    }
}

impl Default for TableDisplay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::snapshot::ResourceKind;

    fn display() -> TableDisplay {
        TableDisplay::new().with_max_width(120).with_colors(false)
    }

    fn summary(id: &str, alias: &str) -> crate::api::models::InstanceSummary {
        serde_json::from_value(serde_json::json!({
            "Id": id,
            "InstanceAlias": alias,
            "InstanceStatus": "ACTIVE"
        }))
        .unwrap()
    }

    fn ok_record(id: &str, alias: &str) -> InstanceRecord {
        InstanceRecord {
            summary: summary(id, alias),
            details: CollectionResult::Ok {
                value: serde_json::from_value(serde_json::json!({
                    "Id": id,
                    "InstanceAlias": alias,
                    "InstanceStatus": "ACTIVE",
                    "IdentityManagementType": "CONNECT_MANAGED",
                    "InboundCallsEnabled": true,
                    "OutboundCallsEnabled": false
                }))
                .unwrap(),
            },
            queues: CollectionResult::Ok {
                value: vec![
                    serde_json::from_value(serde_json::json!({
                        "Id": "q1", "Name": "Billing", "QueueType": "STANDARD"
                    }))
                    .unwrap(),
                ],
            },
            users: CollectionResult::Ok { value: vec![] },
            contact_flows: CollectionResult::Ok {
                value: vec![
                    serde_json::from_value(serde_json::json!({
                        "Id": "f1", "Name": "Inbound", "ContactFlowType": "CONTACT_FLOW",
                        "ContactFlowState": "ACTIVE"
                    }))
                    .unwrap(),
                    serde_json::from_value(serde_json::json!({
                        "Id": "f2", "Name": "Agent whisper", "ContactFlowType": "AGENT_WHISPER",
                        "ContactFlowState": "ARCHIVED"
                    }))
                    .unwrap(),
                ],
            },
            phone_numbers: CollectionResult::Ok { value: vec![] },
            hours_of_operations: CollectionResult::Ok { value: vec![] },
        }
    }

    fn failed_queue_record(id: &str, alias: &str) -> InstanceRecord {
        let mut record = ok_record(id, alias);
        record.queues = CollectionResult::Err {
            error: Diagnostic {
                kind: ResourceKind::Queues,
                instance_id: Some(id.to_string()),
                cause: "Access denied for list_queues: no permission".to_string(),
            },
        };
        record
    }

    #[test]
    fn test_overview_shows_counts_and_failures() {
        let records = vec![ok_record("i-1", "support-desk"), failed_queue_record("i-2", "sales")];
        let rendered = display().render_instance_overview(&records).unwrap();

        assert!(rendered.contains("support-desk"));
        assert!(rendered.contains("sales"));
        // one successful queue listing, one failed one
        assert!(rendered.contains('1'));
        assert!(rendered.contains("err"));
    }

    #[test]
    fn test_snapshot_render_includes_all_sections() {
        let snapshot = Snapshot::assemble(
            "us-east-1",
            vec![failed_queue_record("i-1", "support-desk")],
            false,
        );
        let rendered = display().render_snapshot(&snapshot).unwrap();

        assert!(rendered.contains("Connect inventory for us-east-1"));
        assert!(rendered.contains("Totals"));
        assert!(rendered.contains("Failed sub-queries (1)"));
        assert!(rendered.contains("no permission"));
        assert!(!rendered.contains("partial"));
    }

    #[test]
    fn test_partial_snapshot_is_flagged() {
        let snapshot = Snapshot::assemble("us-east-1", vec![ok_record("i-1", "desk")], true);
        let rendered = display().render_snapshot(&snapshot).unwrap();
        assert!(rendered.contains("partial"));
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::assemble("eu-west-2", vec![], false);
        let rendered = display().render_snapshot(&snapshot).unwrap();
        assert!(rendered.contains("No Connect instances found"));
    }

    #[test]
    fn test_contact_flows_grouped_by_type() {
        let record = ok_record("i-1", "desk");
        let rendered = display().render_contact_flows(&record.contact_flows).unwrap();
        assert!(rendered.contains("2 types"));
        assert!(rendered.contains("AGENT_WHISPER"));
        assert!(rendered.contains("active"));
        assert!(rendered.contains("ARCHIVED"));
    }

    #[test]
    fn test_failed_listing_renders_cause_inline() {
        let record = failed_queue_record("i-1", "desk");
        let rendered = display().render_instance_section(&record).unwrap();
        assert!(rendered.contains("Queues: unavailable"));
        assert!(rendered.contains("no permission"));
    }

    #[test]
    fn test_details_table_fields() {
        let record = ok_record("i-1", "desk");
        let detail = record.details.value().unwrap();
        let rendered = display().render_instance_details(detail).unwrap();
        assert!(rendered.contains("CONNECT_MANAGED"));
        assert!(rendered.contains("Inbound calls"));
        assert!(rendered.contains("enabled"));
        assert!(rendered.contains("disabled"));
    }
}

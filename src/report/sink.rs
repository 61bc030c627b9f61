use std::io::{self, Write};

use serde::Serialize;

use super::{FamilyReport, MetricFamily, Report, Section};
use crate::format::truncate_unicode;

pub trait ReportSink {
    fn emit(&mut self, report: &Report) -> io::Result<()>;
}

/// Plain text, one section per family.
pub struct TextSink<W: Write> {
    out: W,
    max_name_width: usize,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W, max_name_width: usize) -> Self {
        TextSink {
            out,
            max_name_width,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_section(&mut self, section: &Section) -> io::Result<()> {
        for field in &section.fields {
            writeln!(self.out, "{}: {}", field.label, field.value)?;
        }
        for row in &section.rows {
            let cells: Vec<String> = row
                .fields
                .iter()
                .map(|f| format!("{}={}", f.label, truncate_unicode(&f.value, self.max_name_width)))
                .collect();
            writeln!(self.out, "{}: {}", row.kind, cells.join(", "))?;
        }
        Ok(())
    }
}

impl<W: Write> ReportSink for TextSink<W> {
    fn emit(&mut self, report: &Report) -> io::Result<()> {
        for family in &report.families {
            writeln!(self.out, "---------------- {} ----------------", family.family.title())?;
            match &family.outcome {
                Ok(section) => self.write_section(section)?,
                Err(err) => writeln!(self.out, "[unavailable] {err}")?,
            }
        }
        self.out.flush()
    }
}

/// The whole report as one JSON document.
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        JsonSink { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum Status {
    Ok,
    Failed,
}

#[derive(Serialize)]
struct JsonFamily<'a> {
    family: MetricFamily,
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(flatten)]
    section: Option<&'a Section>,
}

impl<'a> From<&'a FamilyReport> for JsonFamily<'a> {
    fn from(report: &'a FamilyReport) -> Self {
        match &report.outcome {
            Ok(section) => JsonFamily {
                family: report.family,
                status: Status::Ok,
                error: None,
                section: Some(section),
            },
            Err(err) => JsonFamily {
                family: report.family,
                status: Status::Failed,
                error: Some(err.to_string()),
                section: None,
            },
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    complete: bool,
    families: Vec<JsonFamily<'a>>,
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn emit(&mut self, report: &Report) -> io::Result<()> {
        let doc = JsonReport {
            complete: report.is_complete(),
            families: report.families.iter().map(JsonFamily::from).collect(),
        };
        serde_json::to_writer_pretty(&mut self.out, &doc)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

pub fn render_text(report: &Report, max_name_width: usize) -> io::Result<String> {
    let mut sink = TextSink::new(Vec::new(), max_name_width);
    sink.emit(report)?;
    String::from_utf8(sink.into_inner()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use crate::report::{Field, Row};

    fn sample_report() -> Report {
        Report {
            families: vec![
                FamilyReport {
                    family: MetricFamily::Memory,
                    outcome: Ok(Section {
                        fields: vec![Field {
                            label: "Total",
                            value: "7.5 GB".into(),
                        }],
                        rows: vec![],
                    }),
                },
                FamilyReport {
                    family: MetricFamily::Tasks,
                    outcome: Err(ProbeError::unavailable("task", "denied")),
                },
            ],
        }
    }

    #[test]
    fn text_marks_failed_family() {
        let text = render_text(&sample_report(), 40).unwrap();
        assert_eq!(
            text,
            "---------------- Memory ----------------\n\
             Total: 7.5 GB\n\
             ---------------- Tasks ----------------\n\
             [unavailable] task provider unavailable: denied\n"
        );
    }

    #[test]
    fn text_truncates_row_values() {
        let report = Report {
            families: vec![FamilyReport {
                family: MetricFamily::Tasks,
                outcome: Ok(Section {
                    fields: vec![],
                    rows: vec![Row {
                        kind: "Task",
                        fields: vec![Field {
                            label: "name",
                            value: "a-very-long-thread-name".into(),
                        }],
                    }],
                }),
            }],
        };
        let text = render_text(&report, 6).unwrap();
        assert!(text.ends_with("Task: name=a-ver\u{2026}\n"));
    }

    #[test]
    fn json_has_status_per_family() {
        let mut sink = JsonSink::new(Vec::new());
        sink.emit(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&sink.into_inner()).unwrap();

        assert_eq!(value["complete"], false);
        assert_eq!(value["families"][0]["family"], "memory");
        assert_eq!(value["families"][0]["status"], "ok");
        assert_eq!(value["families"][0]["fields"][0]["value"], "7.5 GB");
        assert_eq!(value["families"][1]["status"], "failed");
        assert_eq!(
            value["families"][1]["error"],
            "task provider unavailable: denied"
        );
        assert!(value["families"][1].get("fields").is_none());
    }
}

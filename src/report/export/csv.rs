//! CSV report: every data cell quoted, then a blank line and a `Summary` block.

use ::csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::Result;

use super::ReportJob;

pub fn render(job: &ReportJob<'_>) -> Result<Vec<u8>> {
    let mut out = Vec::new();

    {
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(&mut out);

        writer.write_record(job.headers())?;
        for row in &job.rows {
            writer.write_record(job.cells(row).iter().map(|cell| cell.display("")))?;
        }
        writer.flush()?;
    }

    if !job.summary.is_empty() {
        out.push(b'\n');

        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Necessary)
            .flexible(true)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(&mut out);

        writer.write_record(["Summary"])?;
        for (label, value) in job.summary.iter() {
            writer.write_record([label.to_string(), value.plain()])?;
        }
        writer.flush()?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::report::ReportType;
    use crate::report::export::test_support::{fixed_time, rows};
    use crate::table::Column;

    #[test]
    fn test_quotes_every_cell_and_doubles_embedded_quotes() {
        let columns = vec![
            Column::new("studentNumber", "Student No."),
            Column::new("fullName", "Name"),
            Column::new("email", "Email"),
        ];
        let data = rows(json!([
            {"studentNumber": "2021-0001", "lastName": "Dela Cruz", "firstName": "Juan \"JD\"", "email": "jd@school.edu"},
            {"studentNumber": "2021-0002", "lastName": "Santos", "firstName": "Maria", "email": null}
        ]));
        let job = ReportJob::new(ReportType::Student, data, columns.iter().collect(), "Brand", fixed_time());

        let text = String::from_utf8(render(&job).unwrap()).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some("\"Student No.\",\"Name\",\"Email\""));
        assert_eq!(
            lines.next(),
            Some("\"2021-0001\",\"Dela Cruz, Juan \"\"JD\"\"\",\"jd@school.edu\"")
        );
        assert_eq!(lines.next(), Some("\"2021-0002\",\"Santos, Maria\",\"\""));
        assert_eq!(lines.next(), Some(""));
        assert_eq!(lines.next(), Some("Summary"));
        assert_eq!(lines.next(), Some("Total Records,2"));
    }

    #[test]
    fn test_payment_report_layout() {
        let columns = vec![Column::new("status", "Status"), Column::new("amount", "Amount")];
        let data = rows(json!([
            {"status": "PAID", "amount": 100},
            {"status": "PENDING", "amount": 50}
        ]));
        let job = ReportJob::new(ReportType::Payment, data, columns.iter().collect(), "Brand", fixed_time());

        let text = String::from_utf8(render(&job).unwrap()).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "\"Status\",\"Amount\"");
        assert_eq!(lines[1], "\"PAID\",\"100.00\"");
        assert_eq!(lines[2], "\"PENDING\",\"50.00\"");
        assert!(lines.contains(&"Paid Payments,1"));
        assert!(lines.contains(&"Pending Payments,1"));
        assert!(lines.contains(&"Total Amount,150.00"));
    }
}

use crate::application::monitoring::GatewayStatus;
use crate::error::Result;
use std::io::Write;

/// Writes one CSV row per gateway: `gateway,enabled,healthy,success_rate`.
pub struct HealthReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> HealthReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_statuses(&mut self, statuses: Vec<GatewayStatus>) -> Result<()> {
        for status in statuses {
            self.writer.serialize(status)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_statuses() {
        let mut buffer = Vec::new();
        {
            let mut writer = HealthReportWriter::new(&mut buffer);
            writer
                .write_statuses(vec![
                    GatewayStatus {
                        gateway: "razorpay".to_string(),
                        enabled: true,
                        healthy: false,
                        success_rate: 20.0,
                    },
                    GatewayStatus {
                        gateway: "payu".to_string(),
                        enabled: true,
                        healthy: true,
                        success_rate: 100.0,
                    },
                ])
                .unwrap();
        }

        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(
            output,
            "gateway,enabled,healthy,success_rate\nrazorpay,true,false,20.0\npayu,true,true,100.0\n"
        );
    }
}

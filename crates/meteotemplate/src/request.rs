//! Construction of the upload request from a record.

use reqwest::Url;

use crate::config::{Method, UploaderConfig};
use crate::record::Record;
use crate::units::format_value;

pub(crate) const PASSWORD_PARAM: &str = "password";

/// A fully assembled upload, ready to be sent.
///
/// Parameters are ordered: password, timestamp, unit parameters, then one
/// parameter per present observation in field-table order. The same record
/// and configuration always produce the same request.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub endpoint: Url,
    pub method: Method,
    params: Vec<(String, String)>,
    observations: usize,
}

impl UploadRequest {
    pub fn build(record: &Record, config: &UploaderConfig) -> Self {
        let mut params = vec![
            (PASSWORD_PARAM.to_string(), config.password.clone()),
            (config.timestamp_param.clone(), record.date_time.to_string()),
        ];
        params.extend(
            config
                .units
                .params()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );

        let header_len = params.len();
        for field in config.fields.iter() {
            let Some(value) = record.get(&field.observation) else {
                continue;
            };
            if !value.is_finite() {
                continue;
            }
            let converted = config.units.convert(value, field.group, record.unit_system);
            let decimals = config.units.decimals(field.group);
            if let Some(formatted) = format_value(converted, decimals) {
                params.push((field.param.clone(), formatted));
            }
        }
        let observations = params.len() - header_len;

        Self {
            endpoint: config.server_url.clone(),
            method: config.method,
            params,
            observations,
        }
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Value of a single parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Number of observation parameters, excluding password, time and units.
    pub fn observation_count(&self) -> usize {
        self.observations
    }

    /// Endpoint with every parameter in the query string.
    pub fn url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().extend_pairs(&self.params);
        url
    }

    /// Like [`url`](Self::url) but with the password masked, for logging.
    pub fn redacted_url(&self) -> String {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().extend_pairs(self.params.iter().map(|(k, v)| {
            if k == PASSWORD_PARAM {
                (k.as_str(), "XXX")
            } else {
                (k.as_str(), v.as_str())
            }
        }));
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldMap;
    use crate::units::{PressureUnit, TemperatureUnit, UnitSystem, Units};

    fn config() -> UploaderConfig {
        UploaderConfig::new("https://host/plugins/api/update.php", "secret").unwrap()
    }

    fn names(request: &UploadRequest) -> Vec<&str> {
        request.params().iter().map(|(k, _)| k.as_str()).collect()
    }

    #[test]
    fn test_only_present_fields_are_sent() {
        let mut record = Record::new(1_700_000_000, UnitSystem::Metric)
            .with("outTemp", 21.5)
            .with("windDir", 270.0);
        record.set("outHumidity", None);

        let request = UploadRequest::build(&record, &config());
        assert_eq!(names(&request), ["password", "DT", "T", "B"]);
        assert_eq!(request.param("T"), Some("21.5"));
        assert_eq!(request.param("B"), Some("270"));
        assert_eq!(request.param("H"), None);
        assert_eq!(request.observation_count(), 2);
    }

    #[test]
    fn test_record_without_known_fields() {
        let record = Record::new(1_700_000_000, UnitSystem::Metric).with("inTemp", 22.0);
        let request = UploadRequest::build(&record, &config());
        assert_eq!(names(&request), ["password", "DT"]);
        assert_eq!(request.observation_count(), 0);
    }

    #[test]
    fn test_request_is_deterministic() {
        let record = Record::new(1_700_000_000, UnitSystem::Us)
            .with("outTemp", 70.3)
            .with("barometer", 30.01)
            .with("windSpeed", 4.0)
            .with("dayRain", 0.12);
        let config = config();
        let a = UploadRequest::build(&record, &config);
        let b = UploadRequest::build(&record, &config);
        assert_eq!(a, b);
        assert_eq!(a.url(), b.url());
    }

    #[test]
    fn test_example_with_custom_field_names() {
        let mut config = UploaderConfig::new("https://host/api.php", "secret").unwrap();
        config.fields = FieldMap::from_pairs([("temp", "outTemp"), ("humidity", "outHumidity")]);
        config.timestamp_param = "dateutc".into();

        let record = Record::new(1_700_000_000, UnitSystem::Metric)
            .with("outTemp", 21.5)
            .with("outHumidity", 60.0);
        let request = UploadRequest::build(&record, &config);

        assert_eq!(
            request.url().as_str(),
            "https://host/api.php?password=secret&dateutc=1700000000&temp=21.5&humidity=60"
        );
    }

    #[test]
    fn test_metric_rain_converted_to_mm() {
        let record = Record::new(1_700_000_000, UnitSystem::Metric)
            .with("dayRain", 0.32)
            .with("rainRate", 0.1);
        let request = UploadRequest::build(&record, &config());
        assert_eq!(request.param("R"), Some("3.2"));
        assert_eq!(request.param("RR"), Some("1.0"));
    }

    #[test]
    fn test_us_record_with_imperial_units() {
        let mut config = config();
        config.units = Units {
            temperature: TemperatureUnit::Fahrenheit,
            pressure: PressureUnit::Inhg,
            ..Units::default()
        };
        let record = Record::new(1_700_000_000, UnitSystem::Us)
            .with("outTemp", 70.3)
            .with("barometer", 30.012);
        let request = UploadRequest::build(&record, &config);
        assert_eq!(names(&request), ["password", "DT", "uT", "uP", "T", "P"]);
        assert_eq!(request.param("uT"), Some("F"));
        assert_eq!(request.param("uP"), Some("inhg"));
        assert_eq!(request.param("T"), Some("70.3"));
        assert_eq!(request.param("P"), Some("30.012"));
    }

    #[test]
    fn test_non_finite_values_are_skipped() {
        let record = Record::new(1, UnitSystem::Metric)
            .with("outTemp", f64::NAN)
            .with("outHumidity", 50.0);
        let request = UploadRequest::build(&record, &config());
        assert_eq!(request.param("T"), None);
        assert_eq!(request.param("H"), Some("50"));
    }

    #[test]
    fn test_values_overflowing_precision_are_skipped() {
        let mut config = config();
        config.fields = FieldMap::from_pairs([("T", "outTemp"), ("UV", "UV")]);
        let record = Record::new(1, UnitSystem::Metric)
            .with("outTemp", 20.0)
            .with("UV", 1e307);
        let request = UploadRequest::build(&record, &config);

        assert_eq!(request.param("UV"), None);
        assert_eq!(request.param("T"), Some("20.0"));
        assert_eq!(request.observation_count(), 1);
        assert!(!request.url().as_str().contains("inf"));
    }

    #[test]
    fn test_password_passed_through_and_redacted() {
        let config = UploaderConfig::new("https://host/api.php", "p&ss word").unwrap();
        let record = Record::new(1, UnitSystem::Metric).with("outTemp", 1.0);
        let request = UploadRequest::build(&record, &config);

        assert_eq!(request.param("password"), Some("p&ss word"));
        assert!(request.url().as_str().contains("password=p%26ss+word"));

        let redacted = request.redacted_url();
        assert!(redacted.contains("password=XXX"));
        assert!(!redacted.contains("p%26ss"));
    }
}

//! Current weather lookup via OpenWeatherMap

use async_trait::async_trait;

use crate::config::LocationConfig;
use crate::handlers::{Handler, Reply};
use crate::{Error, Result};

/// OpenWeatherMap current weather endpoint
const WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// The parts of the OpenWeatherMap response we announce
#[derive(Debug, serde::Deserialize)]
pub struct WeatherReport {
    pub main: WeatherMain,
    #[serde(default)]
    pub weather: Vec<WeatherDescription>,
}

#[derive(Debug, serde::Deserialize)]
pub struct WeatherMain {
    /// Temperature in Kelvin
    pub temp: f64,

    /// Relative humidity percentage
    pub humidity: f64,
}

#[derive(Debug, serde::Deserialize)]
pub struct WeatherDescription {
    pub description: String,
}

/// Announces the current weather for the configured city
pub struct WeatherHandler {
    client: reqwest::Client,
    api_key: String,
    city: String,
    country_code: String,
}

impl WeatherHandler {
    /// Create a weather handler
    ///
    /// # Errors
    ///
    /// Returns error if the API key or city is missing
    pub fn new(api_key: String, location: &LocationConfig) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenWeatherMap API key required for weather".to_string(),
            ));
        }
        if location.city.is_empty() {
            return Err(Error::Config(
                "location.city required for weather".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            city: location.city.clone(),
            country_code: location.country_code.clone(),
        })
    }
}

#[async_trait]
impl Handler for WeatherHandler {
    fn name(&self) -> &'static str {
        "weather"
    }

    fn keywords(&self) -> &[&'static str] {
        &["the weather", "temperature"]
    }

    async fn handle(&self, _utterance: &str) -> Result<Reply> {
        let query = if self.country_code.is_empty() {
            self.city.clone()
        } else {
            format!("{},{}", self.city, self.country_code)
        };

        let response = self
            .client
            .get(WEATHER_URL)
            .query(&[("q", query.as_str()), ("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "OpenWeatherMap API error");
            return Err(Error::Weather(format!(
                "OpenWeatherMap API error {status}: {body}"
            )));
        }

        let report: WeatherReport = response.json().await?;
        tracing::info!(city = %self.city, temp_kelvin = report.main.temp, "weather fetched");

        Ok(Reply::lines(format_report(&report, &self.city)))
    }
}

/// Format the spoken weather report
#[must_use]
pub fn format_report(report: &WeatherReport, city: &str) -> Vec<String> {
    let celsius = report.main.temp - 273.15;
    let mut lines = vec![format!(
        "Temperature in {city} is {celsius:.0} degrees Celsius and humidity is {:.0} percent.",
        report.main.humidity
    )];

    if let Some(description) = report.weather.first() {
        lines.push(format!("Feels like {}.", description.description));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_report() {
        let report = WeatherReport {
            main: WeatherMain {
                temp: 300.15,
                humidity: 74.0,
            },
            weather: vec![WeatherDescription {
                description: "scattered clouds".to_string(),
            }],
        };

        let lines = format_report(&report, "Mumbai");
        assert_eq!(
            lines,
            vec![
                "Temperature in Mumbai is 27 degrees Celsius and humidity is 74 percent."
                    .to_string(),
                "Feels like scattered clouds.".to_string(),
            ]
        );
    }

    #[test]
    fn test_format_report_no_description() {
        let report = WeatherReport {
            main: WeatherMain {
                temp: 273.15,
                humidity: 40.0,
            },
            weather: vec![],
        };

        let lines = format_report(&report, "Pune");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Temperature in Pune is 0 degrees"));
    }

    #[test]
    fn test_weather_response_parsing() {
        let json = r#"{
            "weather": [{"id": 802, "main": "Clouds", "description": "scattered clouds"}],
            "main": {"temp": 301.4, "feels_like": 303.7, "humidity": 69, "pressure": 1009}
        }"#;

        let report: WeatherReport = serde_json::from_str(json).unwrap();
        assert!((report.main.temp - 301.4).abs() < f64::EPSILON);
        assert_eq!(report.weather[0].description, "scattered clouds");
    }
}

pub fn generate_starter_config() -> String {
    r#"# =============================================================================
# GRIDCO2 CONFIGURATION
# =============================================================================
# This file configures the carbon-intensity sources used by `gridco2 fetch`.
#
# Config file locations (in order of precedence):
#   1. Path specified via --config argument
#   2. ~/.config/gridco2/config.yml
#   3. /etc/gridco2/config.yml
#
# Values of the form $env{NAME} are replaced with environment variables before
# parsing. Loading fails if a referenced variable is not set.

# =============================================================================
# SOURCES
# =============================================================================
# Each key is the source identifier written to the ISO column and used as the
# default output file name (<output.directory>/<source>.csv).
#
# Two fetch styles are supported:
#
#   api         Authenticated JSON endpoint queried once per day with
#               region, start, end and resolution query parameters. The API key
#               is read from the environment variable named by credential_env
#               and sent as the X-Api-Key header. The response must carry a
#               non-null 'data' array of objects with time_field and rate_field.
#
#   static_csv  Unauthenticated per-day CSV file. '{date}' in the URL is
#               replaced with the day formatted by date_format. Each row's
#               time_column (a local time of day) is combined with the day and
#               utc_offset to form start_date.

sources:
  CAISO:
    style: api
    # Replace with your provider's carbon-intensity endpoint
    url: https://api.carbon-provider.example/v1/carbon-intensity
    credential_env: CARBON_API_KEY
    # Interval length requested from the API: ms, s, m or h
    resolution: 5m

  ERCOT:
    style: api
    url: https://api.carbon-provider.example/v1/carbon-intensity
    credential_env: CARBON_API_KEY
    resolution: 5m

  MISO:
    style: api
    url: https://api.carbon-provider.example/v1/carbon-intensity
    credential_env: CARBON_API_KEY
    resolution: 5m

  NYISO:
    style: api
    url: https://api.carbon-provider.example/v1/carbon-intensity
    # Region sent to the endpoint when it differs from the source identifier
    region: NYISO
    credential_env: CARBON_API_KEY
    resolution: 5m

  CAISO_OUTLOOK:
    style: static_csv
    url: https://outlook.grid-operator.example/history/{date}/co2.csv
    date_format: '%Y%m%d'
    time_column: Time
    time_format: '%H:%M'
    rate_column: generated_rate_kg_per_mwh
    utc_offset: '-08:00'

# =============================================================================
# HTTP
# =============================================================================
http:
  # Per-request timeout. Requests are never retried.
  timeout: 30s

# =============================================================================
# OUTPUT
# =============================================================================
output:
  # Directory for fetched tables when --output is not given
  directory: collected
"#
    .to_string()
}

pub enum Template {
    Blank,
    Annotated,
}

pub const BLANK_SCHEMA: &str = r#"{
  "APPLICATION_SERVICE_NAME": "",
  "SERVICE_MAPPINGS": [
    {
      "DB_CI_NAME": "",
      "DB_CI_TYPE": "",
      "SERVER_CI_NAME": "",
      "SERVER_CI_TYPE": "",
      "CLOUD_COMPONENT": "",
      "LOAD_BALANCER": ""
    }
  ]
}
"#;

pub const ANNOTATED_SCHEMA: &str = r#"{
  // CSV column whose value groups rows into application services.
  // Must be a header of the CSV; every row needs a value in this column.
  "APPLICATION_SERVICE_NAME": "Application",

  // Exactly one mapping template is applied to every row.
  // Additional entries are ignored.
  "SERVICE_MAPPINGS": [
    {
      // Each attribute names a CSV column, or "" to leave it empty.
      // Columns missing from the CSV also come out as "" (or fail with --strict).

      // Database entity
      "DB_CI_NAME": "Database Name",
      "DB_CI_TYPE": "Database Type",

      // Server entity
      "SERVER_CI_NAME": "Host",
      "SERVER_CI_TYPE": "",

      // Cloud entity
      "CLOUD_COMPONENT": "",

      // Load balancer entity
      "LOAD_BALANCER": ""
    }
  ]
}
"#;

#[derive(Debug, Clone, Copy)]
pub struct CsvSettings {
    pub delimiter: u8,
}

impl CsvSettings {
    pub fn new(delimiter: u8) -> Self {
        CsvSettings { delimiter }
    }
}

impl Default for CsvSettings {
    fn default() -> Self {
        CsvSettings { delimiter: b',' }
    }
}

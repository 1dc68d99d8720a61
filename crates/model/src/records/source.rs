/// One line of the delimited source, keyed by header name.
///
/// Field order follows the source header. Lookups are by exact name; a
/// field that the line does not carry (short row) is simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRecord {
    fields: Vec<(String, Option<String>)>,
}

impl SourceRecord {
    pub fn new(fields: Vec<(String, Option<String>)>) -> Self {
        SourceRecord { fields }
    }

    /// Zips a header row with the cells of one line. Extra cells without a
    /// header are dropped, missing trailing cells are recorded as absent.
    pub fn from_cells<I, S>(headers: &[String], cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells = cells.into_iter();
        let fields = headers
            .iter()
            .map(|hdr| (hdr.clone(), cells.next().map(Into::into)))
            .collect();
        SourceRecord { fields }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

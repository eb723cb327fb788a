//! Test-only builder for BIFF8 workbooks inside compound containers.
//!
//! Produces the record layout Excel writes: globals with XF, SST and
//! BOUNDSHEET records, then per sheet `INDEX`, `DIMENSIONS`, row blocks with
//! `DBCELL`, `WINDOW2` and `EOF`. The container carries a VBA project storage
//! so preservation can be checked.

use crate::ole::OleWriter;
use crate::ole::xls::records::{BofRecord, DimensionsRecord, rt};
use crate::ole::xls::writer::biff::{self, RowRecord};

/// XF of a cell with the default format
pub(crate) const XF_CELL: u16 = 15;
/// XF with built-in date format 14
pub(crate) const XF_DATE: u16 = 16;
/// XF with custom format 164 (`dd/mm/yyyy`)
pub(crate) const XF_CUSTOM_DATE: u16 = 17;

/// Excel's CLSID for a workbook root storage
pub(crate) const EXCEL_CLSID: [u8; 16] = [
    0x20, 0x08, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x46,
];

#[derive(Debug, Clone)]
enum FixtureCell {
    Number(f64, u16),
    Shared(String),
    Label(String),
    Blank(u16),
    Bool(bool),
    Error(u8),
    MulRk(Vec<i32>),
    MulBlank(u16),
    Formula(f64),
    FormulaText(String),
    SharedFormula(f64),
}

/// One worksheet of a fixture
#[derive(Debug, Clone, Default)]
pub(crate) struct FixtureSheet {
    name: String,
    cells: Vec<(u16, u16, FixtureCell)>,
}

impl FixtureSheet {
    fn push(&mut self, row: u16, col: u16, cell: FixtureCell) -> &mut Self {
        self.cells.retain(|&(r, c, _)| (r, c) != (row, col));
        self.cells.push((row, col, cell));
        self
    }

    pub(crate) fn number(&mut self, row: u16, col: u16, value: f64) -> &mut Self {
        self.push(row, col, FixtureCell::Number(value, XF_CELL))
    }

    pub(crate) fn number_xf(&mut self, row: u16, col: u16, value: f64, xf: u16) -> &mut Self {
        self.push(row, col, FixtureCell::Number(value, xf))
    }

    /// Text stored in the shared string table
    pub(crate) fn text(&mut self, row: u16, col: u16, value: &str) -> &mut Self {
        self.push(row, col, FixtureCell::Shared(value.to_string()))
    }

    /// Text stored inline in a `LABEL` record
    pub(crate) fn label(&mut self, row: u16, col: u16, value: &str) -> &mut Self {
        self.push(row, col, FixtureCell::Label(value.to_string()))
    }

    pub(crate) fn blank(&mut self, row: u16, col: u16, xf: u16) -> &mut Self {
        self.push(row, col, FixtureCell::Blank(xf))
    }

    pub(crate) fn boolean(&mut self, row: u16, col: u16, value: bool) -> &mut Self {
        self.push(row, col, FixtureCell::Bool(value))
    }

    pub(crate) fn error(&mut self, row: u16, col: u16, code: u8) -> &mut Self {
        self.push(row, col, FixtureCell::Error(code))
    }

    /// Consecutive integers from `first_col` in one `MULRK`
    pub(crate) fn mulrk(&mut self, row: u16, first_col: u16, values: &[i32]) -> &mut Self {
        self.push(row, first_col, FixtureCell::MulRk(values.to_vec()))
    }

    /// `count` formatted blanks from `first_col` in one `MULBLANK`
    pub(crate) fn mulblank(&mut self, row: u16, first_col: u16, count: u16) -> &mut Self {
        self.push(row, first_col, FixtureCell::MulBlank(count))
    }

    /// Formula with a cached numeric result
    pub(crate) fn formula(&mut self, row: u16, col: u16, cached: f64) -> &mut Self {
        self.push(row, col, FixtureCell::Formula(cached))
    }

    /// Formula with a cached string result in a `STRING` record
    pub(crate) fn formula_text(&mut self, row: u16, col: u16, cached: &str) -> &mut Self {
        self.push(row, col, FixtureCell::FormulaText(cached.to_string()))
    }

    /// Anchor of a shared formula, followed by its `SHRFMLA` record
    pub(crate) fn shared_formula(&mut self, row: u16, col: u16, cached: f64) -> &mut Self {
        self.push(row, col, FixtureCell::SharedFormula(cached))
    }

    /// Columns covered by a cell entry
    fn span(cell: &FixtureCell, col: u16) -> (u16, u16) {
        match cell {
            FixtureCell::MulRk(values) => (col, col + values.len() as u16 - 1),
            FixtureCell::MulBlank(count) => (col, col + count - 1),
            _ => (col, col),
        }
    }
}

/// Builder for a whole workbook
#[derive(Debug, Clone, Default)]
pub(crate) struct FixtureBook {
    sheets: Vec<FixtureSheet>,
    is_1904: bool,
}

fn record(out: &mut Vec<u8>, record_type: u16, data: &[u8]) {
    biff::write_record(out, record_type, data).unwrap();
}

fn bof(out: &mut Vec<u8>, kind: u16) {
    let mut data = 0x0600u16.to_le_bytes().to_vec();
    data.extend(kind.to_le_bytes());
    data.extend(0x0DBBu16.to_le_bytes());
    data.extend(0x07CCu16.to_le_bytes());
    data.extend(0u32.to_le_bytes());
    data.extend(6u32.to_le_bytes());
    record(out, rt::BOF, &data);
}

fn formula_record(row: u16, col: u16, cached: [u8; 8], shared: bool) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend(row.to_le_bytes());
    data.extend(col.to_le_bytes());
    data.extend(XF_CELL.to_le_bytes());
    data.extend(cached);
    data.extend((if shared { 0x0008u16 } else { 0 }).to_le_bytes());
    data.extend(0u32.to_le_bytes());
    if shared {
        // ptgExp pointing at the anchor
        data.extend(5u16.to_le_bytes());
        data.push(0x01);
        data.extend(row.to_le_bytes());
        data.extend(col.to_le_bytes());
    } else {
        // ptgInt 1
        data.extend(3u16.to_le_bytes());
        data.extend([0x1E, 0x01, 0x00]);
    }
    let mut out = Vec::new();
    record(&mut out, rt::FORMULA, &data);
    out
}

impl FixtureBook {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Every sheet the RJ catalogue names, each with its name in `A1`
    pub(crate) fn rj() -> Self {
        let mut book = Self::new();
        for name in [
            "controle",
            "Recap",
            "transelect",
            "geac_ux",
            "DUBACK#",
            "SetD",
            "jour",
            "depot",
            "daily",
        ] {
            book.sheet(name).text(0, 0, name);
        }
        book
    }

    pub(crate) fn date_1904(mut self) -> Self {
        self.is_1904 = true;
        self
    }

    /// Sheet by name, created on first use
    pub(crate) fn sheet(&mut self, name: &str) -> &mut FixtureSheet {
        match self.sheets.iter().position(|s| s.name == name) {
            Some(i) => &mut self.sheets[i],
            None => {
                self.sheets.push(FixtureSheet {
                    name: name.to_string(),
                    cells: Vec::new(),
                });
                let last = self.sheets.len() - 1;
                &mut self.sheets[last]
            },
        }
    }

    /// The BIFF8 workbook stream
    pub(crate) fn stream(&self) -> Vec<u8> {
        let mut strings: Vec<String> = Vec::new();
        for sheet in &self.sheets {
            for (_, _, cell) in &sheet.cells {
                if let FixtureCell::Shared(text) = cell
                    && !strings.contains(text)
                {
                    strings.push(text.clone());
                }
            }
        }

        let mut out = Vec::new();
        bof(&mut out, BofRecord::GLOBALS);
        record(&mut out, rt::CODEPAGE, &1200u16.to_le_bytes());
        record(&mut out, rt::DATEMODE, &u16::from(self.is_1904).to_le_bytes());

        let mut format = 164u16.to_le_bytes().to_vec();
        crate::ole::xls::utils::encode_unicode_string("dd/mm/yyyy", &mut format);
        record(&mut out, rt::FORMAT, &format);
        for xf in 0..18u16 {
            let ifmt: u16 = match xf {
                XF_DATE => 14,
                XF_CUSTOM_DATE => 164,
                _ => 0,
            };
            let mut data = 0u16.to_le_bytes().to_vec();
            data.extend(ifmt.to_le_bytes());
            data.extend([0; 16]);
            record(&mut out, rt::XF, &data);
        }

        let mut boundsheets = Vec::new();
        for sheet in &self.sheets {
            boundsheets.push(out.len() + 4);
            let mut data = 0u32.to_le_bytes().to_vec();
            data.extend([0x00, 0x00, sheet.name.len() as u8, 0x00]);
            data.extend(sheet.name.as_bytes());
            record(&mut out, rt::BOUNDSHEET, &data);
        }

        let mut sst = (strings.len() as u32).to_le_bytes().to_vec();
        sst.extend((strings.len() as u32).to_le_bytes());
        for text in &strings {
            crate::ole::xls::utils::encode_unicode_string(text, &mut sst);
        }
        record(&mut out, rt::SST, &sst);
        record(&mut out, rt::EOF, &[]);

        for (sheet, at) in self.sheets.iter().zip(boundsheets) {
            let position = out.len() as u32;
            out[at..at + 4].copy_from_slice(&position.to_le_bytes());
            let base = out.len();
            let bytes = self.sheet_stream(sheet, &strings, base);
            out.extend(bytes);
        }
        out
    }

    fn sheet_stream(&self, sheet: &FixtureSheet, strings: &[String], base: usize) -> Vec<u8> {
        let mut cells = sheet.cells.clone();
        cells.sort_by_key(|&(r, c, _)| (r, c));
        let mut rows: Vec<u16> = cells.iter().map(|&(r, _, _)| r).collect();
        rows.dedup();
        let blocks: Vec<&[u16]> = rows.chunks(32).collect();

        let mut out = Vec::new();
        bof(&mut out, BofRecord::WORKSHEET);

        let index_at = out.len();
        let mut index = 0u32.to_le_bytes().to_vec();
        index.extend(u32::from(rows.first().copied().unwrap_or(0)).to_le_bytes());
        index.extend(u32::from(rows.last().map_or(0, |r| r + 1)).to_le_bytes());
        index.extend(0u32.to_le_bytes());
        index.extend(vec![0u8; 4 * blocks.len()]);
        record(&mut out, rt::INDEX, &index);

        let dims = DimensionsRecord::covering(cells.iter().flat_map(|(r, c, cell)| {
            let (first, last) = FixtureSheet::span(cell, *c);
            [(*r, first), (*r, last)]
        }));
        biff::write_dimensions(&mut out, &dims).unwrap();

        let mut dbcells = Vec::new();
        for block in &blocks {
            let first_row_at = out.len();
            for &row in *block {
                let (first, last) = cells
                    .iter()
                    .filter(|(r, _, _)| *r == row)
                    .map(|(_, c, cell)| FixtureSheet::span(cell, *c))
                    .fold((u16::MAX, 0), |(lo, hi), (f, l)| (lo.min(f), hi.max(l + 1)));
                let mut row_record = RowRecord::new(row);
                row_record.set_columns(first, last);
                biff::write_row(&mut out, &row_record).unwrap();
            }
            for (row, col, cell) in cells.iter().filter(|(r, _, _)| block.contains(r)) {
                self.cell_records(&mut out, *row, *col, cell, strings);
            }
            dbcells.push(out.len());
            let back = (out.len() - first_row_at) as u32;
            record(&mut out, rt::DBCELL, &back.to_le_bytes());
        }

        let mut window2 = vec![0xB6, 0x06];
        window2.extend([0; 16]);
        record(&mut out, 0x023E, &window2);
        record(&mut out, rt::EOF, &[]);

        for (i, dbcell) in dbcells.iter().enumerate() {
            let at = index_at + 4 + 16 + i * 4;
            out[at..at + 4].copy_from_slice(&((base + dbcell) as u32).to_le_bytes());
        }
        out
    }

    fn cell_records(&self, out: &mut Vec<u8>, row: u16, col: u16, cell: &FixtureCell, strings: &[String]) {
        let r = row as u32;
        match cell {
            FixtureCell::Number(value, xf) => biff::write_number(out, r, col, *xf, *value).unwrap(),
            FixtureCell::Shared(text) => {
                let index = strings.iter().position(|s| s == text).unwrap() as u32;
                biff::write_labelsst(out, r, col, XF_CELL, index).unwrap();
            },
            FixtureCell::Label(text) => biff::write_label(out, r, col, XF_CELL, text).unwrap(),
            FixtureCell::Blank(xf) => biff::write_blank(out, r, col, *xf).unwrap(),
            FixtureCell::Bool(value) => biff::write_boolerr(out, r, col, XF_CELL, *value).unwrap(),
            FixtureCell::Error(code) => {
                let mut data = row.to_le_bytes().to_vec();
                data.extend(col.to_le_bytes());
                data.extend(XF_CELL.to_le_bytes());
                data.extend([*code, 1]);
                record(out, rt::BOOLERR, &data);
            },
            FixtureCell::MulRk(values) => {
                let mut data = row.to_le_bytes().to_vec();
                data.extend(col.to_le_bytes());
                for value in values {
                    data.extend(XF_CELL.to_le_bytes());
                    data.extend((((*value as u32) << 2) | 0x02).to_le_bytes());
                }
                data.extend((col + values.len() as u16 - 1).to_le_bytes());
                record(out, rt::MULRK, &data);
            },
            FixtureCell::MulBlank(count) => {
                let mut data = row.to_le_bytes().to_vec();
                data.extend(col.to_le_bytes());
                for _ in 0..*count {
                    data.extend(XF_CELL.to_le_bytes());
                }
                data.extend((col + count - 1).to_le_bytes());
                record(out, rt::MULBLANK, &data);
            },
            FixtureCell::Formula(cached) => {
                out.extend(formula_record(row, col, cached.to_le_bytes(), false));
            },
            FixtureCell::FormulaText(cached) => {
                out.extend(formula_record(row, col, [0, 0, 0, 0, 0, 0, 0xFF, 0xFF], false));
                let mut data = Vec::new();
                crate::ole::xls::utils::encode_unicode_string(cached, &mut data);
                record(out, rt::STRING, &data);
            },
            FixtureCell::SharedFormula(cached) => {
                out.extend(formula_record(row, col, cached.to_le_bytes(), true));
                // Range row..=row+1, one column; ptgInt 2
                let mut data = row.to_le_bytes().to_vec();
                data.extend((row + 1).to_le_bytes());
                data.extend([col as u8, col as u8, 0, 2]);
                data.extend(3u16.to_le_bytes());
                data.extend([0x1E, 0x02, 0x00]);
                record(out, rt::SHRFMLA, &data);
            },
        }
    }

    /// Auxiliary streams placed next to the workbook stream
    pub(crate) fn auxiliary_streams() -> Vec<(Vec<&'static str>, Vec<u8>)> {
        let module: Vec<u8> = (0..6000u32).map(|i| (i * 7 % 251) as u8).collect();
        vec![
            (
                vec!["_VBA_PROJECT_CUR", "PROJECT"],
                b"ID=\"{00000000-0000-0000-0000-000000000000}\"\r\nDocument=ThisWorkbook/&H00000000\r\n".to_vec(),
            ),
            (vec!["_VBA_PROJECT_CUR", "PROJECTwm"], b"ThisWorkbook\0T\0h\0\0\0\0\0".to_vec()),
            (vec!["_VBA_PROJECT_CUR", "VBA", "_VBA_PROJECT"], vec![0xCC, 0x61, 0xFF, 0xFF, 0x00, 0x03, 0x00]),
            (vec!["_VBA_PROJECT_CUR", "VBA", "dir"], vec![0x01, 0x2A, 0xB2, 0x00, 0x01, 0x00, 0x04]),
            (vec!["_VBA_PROJECT_CUR", "VBA", "Module1"], module),
            (vec!["\u{5}SummaryInformation"], vec![0xFE, 0xFF, 0x00, 0x00, 0x05, 0x01, 0x02, 0x00]),
        ]
    }

    /// The workbook stream inside a container with a VBA project
    pub(crate) fn container(&self) -> Vec<u8> {
        let mut writer = OleWriter::new();
        writer.set_root_clsid(EXCEL_CLSID);
        writer.create_stream(&["Workbook"], &self.stream()).unwrap();
        writer
            .create_storage_with_class(&["_VBA_PROJECT_CUR"], [0; 16], 0)
            .unwrap();
        writer.create_storage(&["_VBA_PROJECT_CUR", "VBA"]).unwrap();
        for (path, bytes) in Self::auxiliary_streams() {
            writer.create_stream(&path, &bytes).unwrap();
        }
        writer.to_bytes().unwrap()
    }
}

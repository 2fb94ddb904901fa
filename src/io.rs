//! Matrix loading for the command-line front-end.
//!
//! The pipeline itself only ever sees a dense `Array2<f64>`; this module
//! turns files into that form. Two formats are understood: NumPy `.npy`
//! arrays and delimited text with a header row of column names plus a
//! leading name field on every data row (tab-separated by default).

use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ndarray::Array2;
use ndarray_npy::ReadNpyExt;

/// A dense matrix plus whatever entity names the source carried.
#[derive(Debug, Clone)]
pub struct MatrixSource {
    pub data: Array2<f64>,
    /// Names from the leading field of each data row; empty for `.npy`.
    pub row_names: Vec<String>,
    /// Names from the header row; empty for `.npy`.
    pub col_names: Vec<String>,
}

/// Load a matrix from `.npy` or delimited text, dispatching on extension.
pub fn load_matrix(path: &Path) -> Result<MatrixSource, Box<dyn Error>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("npy") => read_npy(path),
        _ => {
            let file = File::open(path)?;
            read_delimited(BufReader::new(file), '\t')
        }
    }
}

fn read_npy(path: &Path) -> Result<MatrixSource, Box<dyn Error>> {
    let reader = File::open(path)?;
    let data = Array2::<f64>::read_npy(reader)?;
    Ok(MatrixSource {
        data,
        row_names: Vec::new(),
        col_names: Vec::new(),
    })
}

/// Parse a header line and named data rows into a dense matrix.
///
/// The header carries one name per column, optionally preceded by an empty
/// corner field over the row-name column; each data row carries its own
/// name followed by exactly that many values. Blank lines are skipped;
/// empty names or value cells anywhere else are rejected rather than
/// silently realigning the remaining fields.
pub fn read_delimited<R: BufRead>(
    reader: R,
    delimiter: char,
) -> Result<MatrixSource, Box<dyn Error>> {
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => return Err("input is empty".into()),
    };
    let mut col_names = split_fields(header.trim(), delimiter);
    if col_names.first().map(String::is_empty).unwrap_or(false) {
        col_names.remove(0);
    }
    if col_names.is_empty() {
        return Err("header row has no column names".into());
    }
    if col_names.iter().any(String::is_empty) {
        return Err("header row has an empty column name".into());
    }

    let mut row_names = Vec::new();
    let mut values = Vec::new();
    let mut n_rows = 0usize;

    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        // Trailing whitespace only; a leading delimiter means an empty
        // name field and must stay visible to the checks below.
        let fields = split_fields(line.trim_end(), delimiter);
        if fields.len() != col_names.len() + 1 {
            return Err(format!(
                "data row {} has {} fields, expected a name plus {} values",
                n_rows + 1,
                fields.len(),
                col_names.len()
            )
            .into());
        }
        if fields[0].is_empty() {
            return Err(format!("data row {} has an empty name field", n_rows + 1).into());
        }

        row_names.push(fields[0].clone());
        for field in &fields[1..] {
            let parsed: f64 = field
                .parse()
                .map_err(|_| format!("data row {}: cannot parse '{}'", n_rows + 1, field))?;
            values.push(parsed);
        }
        n_rows += 1;
    }

    if n_rows == 0 {
        return Err("input has a header but no data rows".into());
    }

    let data = Array2::from_shape_vec((n_rows, col_names.len()), values)?;
    Ok(MatrixSource {
        data,
        row_names,
        col_names,
    })
}

fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    line.split(delimiter)
        .map(|field| field.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_reads_tab_separated_matrix() {
        let text = "doc_a\tdoc_b\tdoc_c\n\
                    term_x\t1.0\t2.0\t3.0\n\
                    term_y\t4.0\t5.0\t6.5\n";
        let source = read_delimited(Cursor::new(text), '\t').unwrap();

        assert_eq!(source.data.dim(), (2, 3));
        assert_eq!(source.col_names, vec!["doc_a", "doc_b", "doc_c"]);
        assert_eq!(source.row_names, vec!["term_x", "term_y"]);
        assert_eq!(source.data[[0, 1]], 2.0);
        assert_eq!(source.data[[1, 2]], 6.5);
    }

    #[test]
    fn test_skips_blank_lines() {
        let text = "a\tb\n\nr1\t1.0\t2.0\n\n\nr2\t3.0\t4.0\n";
        let source = read_delimited(Cursor::new(text), '\t').unwrap();
        assert_eq!(source.data.dim(), (2, 2));
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let text = "a\tb\tc\nr1\t1.0\t2.0\n";
        let err = read_delimited(Cursor::new(text), '\t').unwrap_err();
        assert!(err.to_string().contains("expected a name plus 3 values"));
    }

    #[test]
    fn test_rejects_unparseable_values() {
        let text = "a\tb\nr1\t1.0\tnot_a_number\n";
        let err = read_delimited(Cursor::new(text), '\t').unwrap_err();
        assert!(err.to_string().contains("not_a_number"));
    }

    #[test]
    fn test_rejects_empty_input() {
        assert!(read_delimited(Cursor::new(""), '\t').is_err());
        assert!(read_delimited(Cursor::new("a\tb\n"), '\t').is_err());
    }

    #[test]
    fn test_comma_delimiter() {
        let text = "a,b\nr1,0.5,1.5\n";
        let source = read_delimited(Cursor::new(text), ',').unwrap();
        assert_eq!(source.data.dim(), (1, 2));
        assert_eq!(source.data[[0, 0]], 0.5);
    }

    #[test]
    fn test_header_corner_cell_is_tolerated() {
        let source = read_delimited(Cursor::new(",a,b\nr1,1.0,2.0\n"), ',').unwrap();
        assert_eq!(source.col_names, vec!["a", "b"]);
        assert_eq!(source.data.dim(), (1, 2));

        let source = read_delimited(Cursor::new("\ta\tb\nr1\t1.0\t2.0\n"), '\t').unwrap();
        assert_eq!(source.col_names, vec!["a", "b"]);
    }

    #[test]
    fn test_rejects_row_with_empty_cell_and_extra_field() {
        // The empty cell must not let the trailing values slide into the
        // wrong columns.
        let text = "a\tb\tc\nr1\t\t1.0\t2.0\t3.0\n";
        let err = read_delimited(Cursor::new(text), '\t').unwrap_err();
        assert!(err.to_string().contains("has 5 fields"));
    }

    #[test]
    fn test_rejects_empty_value_cell() {
        let text = "a\tb\nr1\t\t2.0\n";
        let err = read_delimited(Cursor::new(text), '\t').unwrap_err();
        assert!(err.to_string().contains("cannot parse ''"));
    }

    #[test]
    fn test_rejects_empty_header_name() {
        let err = read_delimited(Cursor::new("a,,c\nr1,1.0,2.0,3.0\n"), ',').unwrap_err();
        assert!(err.to_string().contains("empty column name"));
    }

    #[test]
    fn test_rejects_empty_row_name() {
        let err = read_delimited(Cursor::new("a,b\n,1.0,2.0\n"), ',').unwrap_err();
        assert!(err.to_string().contains("empty name field"));
    }
}

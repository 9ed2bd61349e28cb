//! Compiled filters over typed records.

use keyscan_core::schema::{Order, Table, TableBuilder};
use keyscan_core::{DataType, Error, Record, Result, Row, Value};
use keyscan_query::{CompileOptions, Expr, QueryCompiler, SortOrder};
use keyscan_storage::TableStore;

#[derive(Clone, Debug, PartialEq)]
struct Book {
    id: i64,
    author: String,
    year: i32,
}

impl Record for Book {
    fn table() -> Result<Table> {
        TableBuilder::new("books")?
            .add_column("id", DataType::Int64)?
            .add_column("author", DataType::String)?
            .add_column("year", DataType::Int32)?
            .add_primary_key(&["id"])?
            .add_ordered_index("ixAuthorYear", &[("author", Order::Asc), ("year", Order::Desc)])?
            .build()
    }

    fn to_row(&self) -> Row {
        Row::new(vec![
            Value::Int64(self.id),
            Value::from(self.author.as_str()),
            Value::Int32(self.year),
        ])
    }

    fn from_row(row: &Row) -> Result<Self> {
        let id = row
            .get(0)
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::type_mismatch("id", DataType::Int64, "missing"))?;
        let author = row
            .get(1)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::type_mismatch("author", DataType::String, "missing"))?;
        let year = row
            .get(2)
            .and_then(Value::as_i32)
            .ok_or_else(|| Error::type_mismatch("year", DataType::Int32, "missing"))?;
        Ok(Book {
            id,
            author: author.into(),
            year,
        })
    }
}

fn book(id: i64, author: &str, year: i32) -> Book {
    Book {
        id,
        author: author.into(),
        year,
    }
}

fn library() -> (TableStore, Vec<Book>) {
    let books = vec![
        book(1, "le guin", 1969),
        book(2, "le guin", 1974),
        book(3, "banks", 1987),
        book(4, "le guin", 1968),
        book(5, "banks", 1996),
        book(6, "le guin", 2000),
    ];
    let mut store = TableStore::for_record::<Book>().unwrap();
    for b in &books {
        store.insert_record(b).unwrap();
    }
    (store, books)
}

fn author_since() -> Expr {
    Expr::and(
        Expr::eq(Expr::field("author"), Expr::param(0)),
        Expr::ge(Expr::field("year"), Expr::param(1)),
    )
}

#[test]
fn test_typed_records_through_filter() {
    let (store, books) = library();
    let plan = QueryCompiler::new(store.schema())
        .compile(&author_since())
        .unwrap();
    assert_eq!(plan.index_name(), Some("ixAuthorYear"));

    let filter = plan
        .bind(&[Value::from("le guin"), Value::Int32(1969)])
        .unwrap();
    let mut cursor = store.cursor();
    let found: Vec<Book> = filter
        .scan(&mut cursor)
        .map(|b| store.record::<Book>(&b.unwrap()).unwrap())
        .collect();

    // year is descending in the index
    let expected = vec![books[5].clone(), books[1].clone(), books[0].clone()];
    assert_eq!(found, expected);
}

#[test]
fn test_current_record_while_scanning() {
    let (store, books) = library();
    let filter = QueryCompiler::new(store.schema())
        .with_options(CompileOptions {
            order: SortOrder::Desc,
        })
        .compile(&author_since())
        .unwrap()
        .bind(&[Value::from("banks"), Value::Int32(1900)])
        .unwrap();

    let mut cursor = store.cursor();
    let mut scan = filter.scan(&mut cursor);
    let mut found = Vec::new();
    while let Some(bookmark) = scan.next() {
        let bookmark = bookmark.unwrap();
        let current = scan.cursor().current_record::<Book>().unwrap();
        assert_eq!(store.record::<Book>(&bookmark).unwrap(), current);
        found.push(current);
    }
    assert_eq!(found, vec![books[2].clone(), books[4].clone()]);
}

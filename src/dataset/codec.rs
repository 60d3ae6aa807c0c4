//! Arrow IPC encoding of the observation table.
//!
//! The dataset is one IPC file (the feather format) with a fixed column
//! set; an empty file still carries the full schema so a freshly
//! bootstrapped dataset reloads cleanly.

use std::io::Cursor;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, Date32Array, Float64Array, Int32Array, StringArray, TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, Date32Type, Field, Schema, TimeUnit};
use arrow::ipc::reader::FileReader;
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;
use chrono::DateTime;

use super::{collection_tz, Observation};
use crate::error::StoreError;

const TIMEZONE: &str = "+02:00";

/// The fixed column schema: lot, status, time, day, hour, minute, date.
pub fn schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("lot", DataType::Utf8, false),
        Field::new("status", DataType::Float64, false),
        Field::new(
            "time",
            DataType::Timestamp(TimeUnit::Microsecond, Some(TIMEZONE.into())),
            false,
        ),
        Field::new("day", DataType::Int32, false),
        Field::new("hour", DataType::Int32, false),
        Field::new("minute", DataType::Int32, false),
        Field::new("date", DataType::Date32, false),
    ]))
}

/// Serialize rows to Arrow IPC file bytes.
pub fn encode(rows: &[Observation]) -> Result<Vec<u8>, StoreError> {
    let schema = schema();
    let mut buf = Vec::new();
    let mut writer = FileWriter::try_new(&mut buf, &schema)?;
    if !rows.is_empty() {
        writer.write(&to_batch(rows, schema.clone())?)?;
    }
    writer.finish()?;
    drop(writer);
    Ok(buf)
}

/// Deserialize Arrow IPC file bytes back into rows, preserving order.
pub fn decode(bytes: &[u8]) -> Result<Vec<Observation>, StoreError> {
    let reader = FileReader::try_new(Cursor::new(bytes), None)?;
    let mut rows = Vec::new();
    for batch in reader {
        from_batch(&batch?, &mut rows)?;
    }
    Ok(rows)
}

fn to_batch(rows: &[Observation], schema: Arc<Schema>) -> Result<RecordBatch, StoreError> {
    let lot = StringArray::from(rows.iter().map(|r| r.lot.as_str()).collect::<Vec<_>>());
    let status = Float64Array::from(rows.iter().map(|r| r.status).collect::<Vec<_>>());
    let time = TimestampMicrosecondArray::from(
        rows.iter()
            .map(|r| r.time.timestamp_micros())
            .collect::<Vec<_>>(),
    )
    .with_timezone(TIMEZONE);
    let day = Int32Array::from(rows.iter().map(|r| r.day).collect::<Vec<_>>());
    let hour = Int32Array::from(rows.iter().map(|r| r.hour).collect::<Vec<_>>());
    let minute = Int32Array::from(rows.iter().map(|r| r.minute).collect::<Vec<_>>());
    let date = Date32Array::from(
        rows.iter()
            .map(|r| Date32Type::from_naive_date(r.date))
            .collect::<Vec<_>>(),
    );

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(lot) as ArrayRef,
            Arc::new(status) as ArrayRef,
            Arc::new(time) as ArrayRef,
            Arc::new(day) as ArrayRef,
            Arc::new(hour) as ArrayRef,
            Arc::new(minute) as ArrayRef,
            Arc::new(date) as ArrayRef,
        ],
    )?;
    Ok(batch)
}

fn from_batch(batch: &RecordBatch, rows: &mut Vec<Observation>) -> Result<(), StoreError> {
    let lot: &StringArray = column(batch, "lot")?;
    let status: &Float64Array = column(batch, "status")?;
    let time: &TimestampMicrosecondArray = column(batch, "time")?;
    let day: &Int32Array = column(batch, "day")?;
    let hour: &Int32Array = column(batch, "hour")?;
    let minute: &Int32Array = column(batch, "minute")?;
    let date: &Date32Array = column(batch, "date")?;

    let tz = collection_tz();
    for i in 0..batch.num_rows() {
        let micros = time.value(i);
        let captured = DateTime::from_timestamp_micros(micros)
            .ok_or_else(|| StoreError::Corrupt(format!("timestamp out of range: {micros}")))?
            .with_timezone(&tz);
        rows.push(Observation {
            lot: lot.value(i).to_string(),
            status: status.value(i),
            time: captured,
            day: day.value(i),
            hour: hour.value(i),
            minute: minute.value(i),
            date: Date32Type::to_naive_date(date.value(i)),
        });
    }
    Ok(())
}

fn column<'a, A: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a A, StoreError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| StoreError::Corrupt(format!("missing column: {name}")))?
        .as_any()
        .downcast_ref::<A>()
        .ok_or_else(|| StoreError::Corrupt(format!("unexpected type for column: {name}")))
}

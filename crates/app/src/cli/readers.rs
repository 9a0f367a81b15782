use kiosk_app::context::KioskContext;

pub(crate) async fn run(context: &KioskContext) -> Result<(), String> {
    let readers = context
        .bootstrap
        .list_readers()
        .await
        .map_err(|error| error.to_string())?;

    if readers.is_empty() {
        println!("no readers registered");
    }

    for reader in readers {
        println!("{}\t{}\t{}", reader.id, reader.name, reader.reader_id);
    }

    Ok(())
}

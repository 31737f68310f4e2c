use std::io::Error;
use std::path::Path;

pub fn write_accounts_csv(path: &Path, rows: &[(&str, u64, &str, &str)]) -> Result<(), Error> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["account", "owner", "balance", "status"])?;
    for (account, owner, balance, status) in rows {
        let owner = owner.to_string();
        wtr.write_record([*account, owner.as_str(), *balance, *status])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_operations_csv(
    path: &Path,
    rows: &[(&str, u64, &str, &str, &str)],
) -> Result<(), Error> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "type",
        "user",
        "account",
        "counterparty",
        "amount",
        "description",
        "reference",
    ])?;
    for (op_type, user, account, counterparty, amount) in rows {
        let user = user.to_string();
        wtr.write_record([
            *op_type,
            user.as_str(),
            *account,
            *counterparty,
            *amount,
            "",
            "",
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

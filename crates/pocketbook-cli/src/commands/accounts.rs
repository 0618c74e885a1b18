//! Account command implementations

use anyhow::{bail, Context, Result};
use pocketbook_core::{
    delete_user_data, Database, IdentityProvider, LocalIdentity, ObjectStore, SignUp,
};

pub fn cmd_signup(db: &Database, email: &str, name: &str, password: &str) -> Result<String> {
    let identity = LocalIdentity::new(db.clone());
    let user = identity
        .sign_up(&SignUp {
            email: email.to_string(),
            name: name.to_string(),
            password: password.to_string(),
            confirm_password: password.to_string(),
        })
        .context("Sign-up failed")?;

    println!("✅ Account created for {}", user.email);
    println!("   User id: {}", user.id);

    Ok(user.id)
}

/// Re-verify the password, then remove the account and everything it owns
pub fn cmd_delete_account(
    db: &Database,
    store: &dyn ObjectStore,
    user_id: &str,
    password: &str,
) -> Result<()> {
    let identity = LocalIdentity::new(db.clone());

    if !identity.verify_password(user_id, password)? {
        bail!("Password verification failed; nothing was deleted");
    }

    let report =
        delete_user_data(db, &identity, store, user_id).context("Account deletion failed")?;

    println!("🗑️  Account {} deleted", user_id);
    println!("   Transactions removed: {}", report.transactions);
    println!("   Goals removed: {}", report.goals);
    println!("   Loans removed: {}", report.loans);
    if report.profile_picture_removed {
        println!("   Profile picture removed");
    }

    Ok(())
}

//! End-to-end runs against live MySQL and PostgreSQL. Ignored by default;
//! they expect the databases behind `TEST_MYSQL_URL` and `TEST_PG_URL`.

use crate::{TEST_MYSQL_URL, TEST_PG_URL};
use mysql_async::prelude::Queryable;
use std::collections::HashMap;
use tokio_postgres::{Client, NoTls};

pub const TARGET_DDL: &str = r#"
    DROP TABLE IF EXISTS clifornec, cidadeestado, usuario, centrocusto, plc, tipopag;
    CREATE TABLE cidadeestado (id INTEGER PRIMARY KEY, nomecidade VARCHAR(100), nomeestado VARCHAR(2));
    CREATE TABLE usuario (id SERIAL PRIMARY KEY, name VARCHAR(100), email VARCHAR(150), senha VARCHAR(100));
    CREATE TABLE clifornec (
        cgc VARCHAR(20) PRIMARY KEY, razaosocial VARCHAR(150), nomefantasia VARCHAR(150),
        numeroend VARCHAR(20), email VARCHAR(150), cep VARCHAR(10), rua VARCHAR(150),
        bairro VARCHAR(100), idcidadeestado INTEGER REFERENCES cidadeestado(id), numerocel VARCHAR(20)
    );
    CREATE TABLE centrocusto (id INTEGER PRIMARY KEY, nome VARCHAR(100));
    CREATE TABLE plc (codiconta VARCHAR(20) PRIMARY KEY, descconta VARCHAR(150), tipoconta INTEGER);
    CREATE TABLE tipopag (id INTEGER PRIMARY KEY, nome VARCHAR(100));
"#;

pub const LEGACY_DDL: [&str; 13] = [
    "DROP TABLE IF EXISTS USUARIO, MUNICIPIO, FORNECEDOR, CLIENTE, CENTROCUSTO, PLC, TIPOCOB",
    "CREATE TABLE USUARIO (NOME VARCHAR(100), EMAIL VARCHAR(150), SENHA VARCHAR(100), ATIVO CHAR(1))",
    "CREATE TABLE MUNICIPIO (ID_MUNICIPIO INT, MUNICIPIO VARCHAR(100), UF CHAR(2))",
    "CREATE TABLE FORNECEDOR (CGCFORNEC VARCHAR(20), RAZAOFORNEC VARCHAR(150), NOMEFANTFORNEC VARCHAR(150), \
     NUMEROEND VARCHAR(20), EMAILFORNEC VARCHAR(150), CEPFORNEC VARCHAR(10), ENDFORNEC VARCHAR(150), \
     BAIRROFORNEC VARCHAR(100), ID_MUNICIPIO INT, FONE1FORNEC VARCHAR(20))",
    "CREATE TABLE CLIENTE (CGCCLI VARCHAR(20), RAZSOCCLI VARCHAR(150), NOMFANTCLI VARCHAR(150), \
     NUMEROEND VARCHAR(20), EMAILCLI VARCHAR(150), CEPCLI VARCHAR(10), ENDCLI VARCHAR(150), \
     BAIRROCLI VARCHAR(100), ID_MUNICIPIO INT, FONE1CLI VARCHAR(20))",
    "CREATE TABLE CENTROCUSTO (codcentrocust INT, desccentrcust VARCHAR(100))",
    "CREATE TABLE PLC (codiconta VARCHAR(20), descconta VARCHAR(150), tipoconta VARCHAR(5))",
    "CREATE TABLE TIPOCOB (codicob VARCHAR(5), desccob VARCHAR(100))",
    "INSERT INTO MUNICIPIO VALUES (1, 'Joinville', 'SC'), (2, 'Curitiba', 'PR')",
    "INSERT INTO FORNECEDOR VALUES ('12345', 'Fornecedor Um', NULL, '10', NULL, NULL, NULL, NULL, 1, NULL), \
     ('222', 'Fornecedor Dois', NULL, '20', NULL, NULL, NULL, NULL, 2, NULL)",
    "INSERT INTO CLIENTE VALUES ('12345', 'Cliente Um', NULL, '30', NULL, NULL, NULL, NULL, 2, NULL), \
     ('', 'Sem CGC', NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL)",
    "INSERT INTO CENTROCUSTO VALUES (10, 'Administrativo'), (20, 'Comercial')",
    "INSERT INTO TIPOCOB VALUES ('1', 'Dinheiro'), ('2', 'Boleto')",
];

pub async fn pg_client() -> Client {
    let (client, connection) = tokio_postgres::connect(TEST_PG_URL, NoTls)
        .await
        .expect("connect postgres");
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("postgres connection error: {e}");
        }
    });
    client
}

pub async fn reset_target() {
    pg_client()
        .await
        .batch_execute(TARGET_DDL)
        .await
        .expect("reset target schema");
}

pub async fn seed_legacy(extra: &[&str]) {
    let pool = mysql_async::Pool::from_url(TEST_MYSQL_URL).expect("mysql url");
    let mut conn = pool.get_conn().await.expect("connect mysql");
    for stmt in LEGACY_DDL.iter().chain(extra) {
        conn.query_drop(*stmt).await.expect("seed legacy store");
    }
    drop(conn);
    pool.disconnect().await.expect("disconnect mysql");
}

pub async fn row_count(table: &str) -> i64 {
    pg_client()
        .await
        .query_one(&format!("SELECT COUNT(*) FROM {table}"), &[])
        .await
        .expect("count rows")
        .get(0)
}

pub fn settings_vars() -> HashMap<String, String> {
    [
        ("SOURCE_URL", TEST_MYSQL_URL),
        ("TARGET_URL", TEST_PG_URL),
        ("CHUNK_PAUSE_MS", "0"),
        ("HASH_ROUNDS", "4"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

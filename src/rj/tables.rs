//! Static address tables of the RJ workbook.
//!
//! Addresses are A1 references and column letters exactly as they appear in
//! Excel; [`Catalogue::builtin`](super::Catalogue::builtin) converts them to
//! zero-based positions once.

use phf::phf_map;

pub(crate) type AddressTable = phf::Map<&'static str, &'static str>;

/// `controle`: date of the audit and year-to-date statistics
pub(crate) static CONTROLE: AddressTable = phf_map! {
    "prepare_par" => "B2",
    "jour" => "B3",
    "mois" => "B4",
    "annee" => "B5",
    "temperature" => "B6",
    "condition" => "B7",
    "chambres_refaire" => "B9",
    "dollar_sales_ytd" => "B10",
    "dollar_sales_prev" => "B11",
    "rooms_available_ytd" => "B12",
    "rooms_available_prev" => "B13",
    "rooms_occupied_ytd" => "B14",
    "rooms_occupied_prev" => "B15",
    "room_revenue_ytd" => "B16",
    "room_revenue_prev" => "B17",
    "closing_balance" => "B18",
    "hotel_name" => "B20",
    "total_rooms" => "B21",
    "days_in_month" => "B27",
    "audit_date" => "B28",
};

/// `Recap`: cash recap, reading (`lecture`) and correction (`corr`) columns
pub(crate) static RECAP: AddressTable = phf_map! {
    "date" => "E1",
    "comptant_lightspeed_lecture" => "B6",
    "comptant_lightspeed_corr" => "C6",
    "comptant_positouch_lecture" => "B7",
    "comptant_positouch_corr" => "C7",
    "cheque_payment_register_lecture" => "B8",
    "cheque_payment_register_corr" => "C8",
    "cheque_daily_revenu_lecture" => "B9",
    "cheque_daily_revenu_corr" => "C9",
    "remb_gratuite_lecture" => "B11",
    "remb_gratuite_corr" => "C11",
    "remb_client_lecture" => "B12",
    "remb_client_corr" => "C12",
    "due_back_reception_lecture" => "B16",
    "due_back_reception_corr" => "C16",
    "due_back_nb_lecture" => "B17",
    "due_back_nb_corr" => "C17",
    "surplus_deficit_lecture" => "B19",
    "surplus_deficit_corr" => "C19",
    "argent_recu" => "B24",
    "prepare_par" => "B26",
};

/// `transelect`: card settlements per outlet and terminal
pub(crate) static TRANSELECT: AddressTable = phf_map! {
    "date" => "B5",
    "prepare_par" => "B6",
    "bar_701_debit" => "B9",
    "bar_701_visa" => "B10",
    "bar_701_master" => "B11",
    "bar_701_amex" => "B13",
    "bar_702_debit" => "C9",
    "bar_702_visa" => "C10",
    "bar_702_master" => "C11",
    "bar_702_amex" => "C13",
    "bar_703_debit" => "D9",
    "bar_703_visa" => "D10",
    "bar_703_master" => "D11",
    "bar_703_amex" => "D13",
    "spesa_704_debit" => "E9",
    "spesa_704_visa" => "E10",
    "spesa_704_master" => "E11",
    "spesa_704_amex" => "E13",
    "room_705_visa" => "F10",
    "reception_debit" => "D20",
    "reception_visa_term" => "D21",
    "reception_master_term" => "D22",
    "reception_amex_term" => "D24",
    "reception_debit_term8" => "C20",
    "fusebox_visa" => "B21",
    "fusebox_master" => "B22",
    "fusebox_amex" => "B24",
    "quasimodo_debit" => "E20",
    "quasimodo_visa" => "E21",
    "quasimodo_master" => "E22",
    "quasimodo_amex" => "E24",
};

/// `geac_ux`: front-office system report
pub(crate) static GEAC_UX: AddressTable = phf_map! {
    "date" => "E22",
    "amex_cash_out" => "B6",
    "diners_cash_out" => "E6",
    "master_cash_out" => "G6",
    "visa_cash_out" => "J6",
    "discover_cash_out" => "K6",
    "amex_total" => "B10",
    "diners_total" => "E10",
    "master_total" => "G10",
    "visa_total" => "J10",
    "discover_total" => "K10",
    "amex_daily_revenue" => "B12",
    "diners_daily_revenue" => "E12",
    "master_daily_revenue" => "G12",
    "visa_daily_revenue" => "J12",
    "discover_daily_revenue" => "K12",
    "balance_previous" => "B32",
    "balance_previous_guest" => "E32",
    "balance_today" => "B37",
    "balance_today_guest" => "E37",
    "facture_direct" => "B41",
    "facture_direct_guest" => "G41",
    "adv_deposit" => "B44",
    "adv_deposit_applied" => "J44",
    "new_balance" => "B53",
    "new_balance_guest" => "E53",
};

/// Sheets with a field table
pub(crate) static FIELD_TABLES: [(&str, &AddressTable); 4] = [
    ("controle", &CONTROLE),
    ("Recap", &RECAP),
    ("transelect", &TRANSELECT),
    ("geac_ux", &GEAC_UX),
];

/// `DUBACK#` receptionist columns, keyed by the header name
pub(crate) static DUBACK_RECEPTIONISTS: AddressTable = phf_map! {
    "Araujo" => "C",
    "Latulippe" => "D",
    "Caron" => "E",
    "Nader" => "F",
    "Mompremier" => "G",
    "oppong" => "H",
    "SEDDIK" => "I",
    "Kimberly" => "J",
    "AYA" => "K",
    "Leo" => "L",
    "THANKARAJAH" => "M",
    "CINDY" => "N",
    "Manolo" => "O",
    "MOUATARIF" => "P",
    "KRAY" => "Q",
    "NITHYA" => "R",
    "DAMAL" => "S",
    "MAUDE" => "T",
    "OLGA" => "U",
    "Sylvie" => "V",
    "Emery" => "W",
    "Ben mansour" => "X",
    "ANNIE-LIS" => "Y",
    "Total" => "Z",
};

/// `jour` columns receiving the card totals
pub(crate) static JOUR_CARDS: AddressTable = phf_map! {
    "amex_elavon" => "BI",
    "discover" => "BJ",
    "master" => "BK",
    "visa" => "BL",
    "debit" => "BM",
    "amex_global" => "BN",
};

/// Card order of the `transelect` totals row, starting at column B
pub(crate) static CARD_ORDER: [&str; 6] = ["amex_elavon", "discover", "master", "visa", "debit", "amex_global"];

/// `SetD` personnel account columns
pub(crate) static SETD_PERSONNEL: AddressTable = phf_map! {
    "Martine Breton" => "C",
    "Petite Caisse" => "E",
    "Conc. Banc." => "F",
    "Corr. Mois suivant" => "G",
    "JEAN PHILIPPE" => "H",
    "Tristan Tremblay" => "I",
    "Mandy Le" => "J",
    "Frederic Dupont" => "K",
    "Florence Roy" => "L",
    "Marie Carlesso" => "M",
    "Patrick Caron" => "N",
    "KARL LECLERC" => "O",
    "Stéphane Latulippe" => "P",
    "natalie rousseau" => "Q",
    "DAVID GIORGI" => "R",
    "YOUSSIF GANNI" => "S",
    "MYRLENE BELIVEAU" => "T",
    "EMMANUELLE LUSSIER" => "U",
    "DANIELLE BELANGER" => "V",
    "VALERIE GUERIN" => "W",
    "Youri Georges" => "X",
    "Alexandre Thifault" => "Y",
    "Julie Dagenais" => "Z",
    "PATRICK MARTEL" => "AA",
    "Nelson Dacosta" => "AB",
    "NAOMIE COLIN" => "AC",
    "SOPHIE CHIARUCCI" => "AD",
    "CHRISTOS MORENTZOS" => "AE",
    "WOODS John" => "AF",
    "MARCO Sabourin" => "AG",
    "sachetti francois" => "AH",
    "caouette Phillipe" => "AI",
    "Caron Patrick" => "AJ",
    "MIXOLOGUE" => "AK",
    "GIOVANNI TOMANELLI" => "AL",
    "Mathieu Guerit" => "AN",
    "Marie Eve" => "AO",
    "CARL Tourangeau" => "AP",
    "MAUDE GAUTHIER" => "AQ",
    "Stephane Bernachez" => "AR",
    "Jonathan Samedy" => "AS",
    "NICOLAS Bernatchez" => "AT",
    "JULIEN BAZAGLE" => "AU",
    "Panayota Lappas" => "AV",
    "PLINIO TESTA Campos" => "AW",
    "spiro Katsenis" => "AX",
    "Isabelle Leclair" => "AY",
    "ANAIS BESETTE" => "AZ",
    "DRAGAN MILOVIC" => "BA",
    "LIDA RAMASAN" => "BB",
    "RAFFI OYAN" => "BC",
    "CECIL PATRICIA" => "BD",
    "QUENTIN BRUNET" => "BE",
    "Sabrina Gagnon" => "BF",
    "NOEMY ROY" => "BG",
    "Melanie Guilemette" => "BH",
    "Pierre-luc Lapointe" => "BI",
    "Adelaide Rancourt" => "BJ",
    "theriault emilie" => "BK",
    "Sandra Tremblay" => "BL",
    "DAVID DFAUCHER" => "BM",
    "LINDA" => "BN",
    "olivier lamothe" => "BO",
    "gozzi alexandra" => "BP",
    "Sarah Vesnaver" => "BQ",
    "Forget Caroline" => "BR",
    "ANDREW STEPHANE" => "BS",
    "Tremblay Caroline" => "BT",
    "jessica simon" => "BU",
    "Francis Latour" => "BV",
    "Constantino Difruschia" => "BW",
    "Cuong Tran" => "BX",
    "MATHIEU GUERIT" => "BY",
    "Youri George" => "BZ",
    "Arnaud Duguay" => "CA",
    "JOSE LATUPLIPPE" => "CB",
    "Mixologue 2.0" => "CC",
    "MIXOLOGUE 3.0" => "CE",
    "Dany Prouxl-Rivard" => "CF",
    "JONNI LANGLOIS" => "CG",
    "Laurence" => "CH",
    "Morgane Muffait" => "CI",
    "NICOLE" => "CJ",
    "VICTOR GUEFAELLY" => "CK",
    "Emma Heguy" => "CL",
    "MANON RINGROSE" => "CM",
    "lethicia heinmeyer" => "CN",
    "Stephanie desjardins" => "CO",
    "Elisabetta Lungarini" => "CP",
    "France bergeron" => "CR",
    "kalena Caticchio" => "CS",
    "Nicolle Blanchard" => "CT",
    "DRAGANA RADOVANOVIC" => "CU",
    "elena kaltsoudas" => "CV",
    "Jean-Seb. Pitre" => "CW",
    "CHARLES R" => "CX",
    "Pier Audrey Belanger" => "CY",
    "GINO MOURIN" => "CZ",
    "Sophie c" => "DA",
    "Philippe Caouette" => "DB",
    "Marly Innocent" => "DC",
    "MOHAMED ELSABER" => "DD",
    "SOULEYMANE CAMARA" => "DE",
    "KHALIL MOUATARIF" => "DF",
    "MANOLO C" => "DG",
    "Laeticia Nader" => "DH",
    "Sylvie Pierre" => "DI",
    "Debbie Fleurant-Rioux" => "DJ",
    "Debby Araujo" => "DK",
    "Isabelle Caron" => "DL",
    "Rose-Delande Mompremier" => "DM",
    "ANGELO JOSEPH" => "DN",
    "ANNIE" => "DO",
    "JEAN-MICHEL CYR" => "DP",
    "damal Kelly" => "DQ",
    "JESSICA SIMON" => "DR",
    "levesque MAUDE" => "DS",
    "Josée Latulippe" => "DT",
    "SARAH MADITUKA" => "DU",
    "LEO SCARPA" => "DV",
    "Schneidine" => "DX",
    "thaneekan" => "DY",
    "AYA BACHARI" => "DZ",
    "SEDDIK ZAYEN" => "EA",
    "VALERIE KRAY" => "EB",
    "sarah" => "EC",
    "OPPONG ZANETA" => "ED",
    "guylaine" => "EE",
    "pierre cindy" => "EF",
    "Cristancho Natalia" => "EH",
    "Durocher Stéphanie" => "EI",};

/// Ranges cleared when a new audit day starts: `(first_row, last_row,
/// first_col, last_col)`, zero-based and inclusive
pub(crate) static RESET_RANGES: [(&str, &[(u32, u32, u32, u32)]); 5] = [
    // B6:C20, D9:D10, D12:D14, D16, D18
    ("Recap", &[(5, 19, 1, 2), (8, 9, 3, 3), (11, 13, 3, 3), (15, 15, 3, 3), (17, 17, 3, 3)]),
    // B9:U13, X9:X13, B20:H24, J20:P24
    ("transelect", &[(8, 12, 1, 20), (8, 12, 23, 23), (19, 23, 1, 7), (19, 23, 9, 15)]),
    (
        "geac_ux",
        &[
            (5, 5, 1, 2),
            (5, 5, 4, 4),
            (5, 5, 6, 7),
            (5, 5, 9, 9),
            (7, 7, 1, 2),
            (7, 7, 4, 4),
            (7, 7, 6, 7),
            (7, 7, 9, 9),
            (11, 11, 1, 2),
            (11, 11, 4, 4),
            (11, 11, 6, 7),
            (11, 11, 9, 9),
            (31, 31, 1, 2),
            (31, 31, 4, 4),
            (36, 36, 1, 2),
            (36, 36, 4, 4),
            (40, 40, 1, 2),
            (40, 40, 6, 7),
            (43, 43, 1, 2),
            (43, 43, 9, 10),
            (46, 46, 1, 2),
            (46, 46, 4, 4),
            (49, 49, 1, 2),
            (49, 49, 4, 4),
            (52, 52, 1, 2),
            (52, 52, 4, 4),
        ],
    ),
    // A10:K42
    ("depot", &[(9, 41, 0, 10)]),
    // B2:B41, B44, B47
    ("daily", &[(1, 40, 1, 1), (43, 43, 1, 1), (46, 46, 1, 1)]),
];

use chrono::{DateTime, Utc};
use tonsig_tlb::{
    Error,
    bits::{
        de::{BitReader, BitReaderExt, r#as::BitUnpackAs},
        ser::{BitWriter, BitWriterExt, r#as::BitPackAs},
    },
};

/// Adapter to **de**/**ser**ialize UNIX timestamp as `u32` from [`DateTime`]
pub struct UnixTimestamp;

impl BitPackAs<DateTime<Utc>> for UnixTimestamp {
    #[inline]
    fn pack_as<W>(source: &DateTime<Utc>, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        let timestamp = u32::try_from(source.timestamp())
            .map_err(|_| W::Error::custom("timestamp: overflow"))?;
        writer.pack(timestamp)?;
        Ok(())
    }
}

impl BitUnpackAs<DateTime<Utc>> for UnixTimestamp {
    #[inline]
    fn unpack_as<R>(reader: &mut R) -> Result<DateTime<Utc>, R::Error>
    where
        R: BitReader + ?Sized,
    {
        let timestamp: u32 = reader.unpack()?;
        DateTime::from_timestamp(timestamp as i64, 0)
            .ok_or_else(|| Error::custom("timestamp: overflow"))
    }
}

/// `uint32` where zero means "not set"
impl BitPackAs<Option<DateTime<Utc>>> for UnixTimestamp {
    #[inline]
    fn pack_as<W>(source: &Option<DateTime<Utc>>, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        writer.pack_as::<_, Self>(source.unwrap_or(DateTime::UNIX_EPOCH))?;
        Ok(())
    }
}

impl BitUnpackAs<Option<DateTime<Utc>>> for UnixTimestamp {
    #[inline]
    fn unpack_as<R>(reader: &mut R) -> Result<Option<DateTime<Utc>>, R::Error>
    where
        R: BitReader + ?Sized,
    {
        Ok(Some(reader.unpack_as::<DateTime<Utc>, Self>()?)
            .filter(|dt| *dt != DateTime::UNIX_EPOCH))
    }
}

#[cfg(test)]
mod tests {
    use tonsig_tlb::bits::{de::r#as::unpack_fully_as, ser::r#as::pack_as};

    use super::*;

    #[test]
    fn unix_timestamp_serde() {
        let ts = DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        let packed = pack_as::<_, UnixTimestamp>(ts).unwrap();
        assert_eq!(packed.len(), 32);
        let got: DateTime<Utc> = unpack_fully_as::<_, UnixTimestamp>(&packed).unwrap();

        assert_eq!(got, ts);
    }

    #[test]
    fn epoch_is_none() {
        let packed = pack_as::<Option<DateTime<Utc>>, UnixTimestamp>(None).unwrap();
        let got: Option<DateTime<Utc>> = unpack_fully_as::<_, UnixTimestamp>(&packed).unwrap();
        assert_eq!(got, None);
    }

    #[test]
    fn before_epoch_overflows() {
        let ts = DateTime::from_timestamp(-1, 0).unwrap();
        assert!(pack_as::<_, UnixTimestamp>(ts).is_err());
    }
}
